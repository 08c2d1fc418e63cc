use ordinals::Edict;
use runeswap_types::{CoinBalance, InputCoin, OutputCoin, Utxo};
use tracing::debug;

use crate::address::parse_address;
use crate::assemble::{InputOwner, TxAssembler};
use crate::constants::DUST_LIMIT;
use crate::edict::{change_edicts, encode_runestone, plan_rune_change, rune_id};
use crate::error::BuildError;
use crate::ops::{fund_and_finalize, swap_intention, BuildContext, SwapTx};
use crate::pool::PoolSnapshot;
use crate::select::select_rune_utxos;

/// Builds a swap selling `btc_amount` satoshis into the pool for the quoted
/// `rune_out` units.
///
/// The economic BTC is supplied by the payer inside the convergence loop;
/// there is no separate user BTC input. When the quote drains the pool's
/// rune side completely there is no change edict and the user's dust output
/// takes index 0, otherwise the pool's change output comes first.
pub async fn build_swap_btc_to_rune(
    ctx: &BuildContext<'_>,
    pool: &PoolSnapshot,
    btc_amount: u64,
    rune_out: u128,
) -> Result<SwapTx, BuildError> {
    debug!(pool = %pool.address, btc_amount, rune_out, "building btc->rune swap");

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_addr = parse_address(&pool.address, ctx.network)?;

    let remaining_rune = pool
        .rune_reserve()
        .checked_sub(rune_out)
        .ok_or(BuildError::Math)?;
    let pool_btc = pool
        .btc_reserve()
        .checked_add(btc_amount)
        .ok_or(BuildError::Math)?;

    let mut assembler = TxAssembler::new(ctx.enable_rbf);
    for utxo in &pool.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }

    let mut edicts = Vec::new();
    let pool_index;
    if remaining_rune > 0 {
        pool_index = assembler.push_output(pool_addr.script_pubkey(), pool_btc);
        let user_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
        edicts.push(Edict {
            id: rune_id(pool.coin_id)?,
            amount: remaining_rune,
            output: pool_index,
        });
        edicts.push(Edict {
            id: rune_id(pool.coin_id)?,
            amount: rune_out,
            output: user_index,
        });
    } else {
        let user_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
        pool_index = assembler.push_output(pool_addr.script_pubkey(), pool_btc);
        edicts.push(Edict {
            id: rune_id(pool.coin_id)?,
            amount: rune_out,
            output: user_index,
        });
    }
    assembler.push_op_return(encode_runestone(edicts));

    let tx = fund_and_finalize(assembler, ctx, &user, vec![pool.address.clone()]).await?;

    let intention = swap_intention(
        &pool.address,
        pool.nonce,
        pool.spent_outpoints(),
        vec![format!("{}:{}", tx.txid, pool_index)],
        vec![InputCoin {
            coin: CoinBalance::btc(btc_amount),
            from: ctx.wallet.address.clone(),
        }],
        vec![OutputCoin {
            coin: CoinBalance::new(pool.coin_id, rune_out),
            to: ctx.wallet.address.clone(),
        }],
    );

    Ok(SwapTx {
        tx,
        intentions: vec![intention],
    })
}

/// Builds a swap selling `rune_amount` units into the pool for the quoted
/// `btc_out` satoshis.
pub async fn build_swap_rune_to_btc(
    ctx: &BuildContext<'_>,
    pool: &PoolSnapshot,
    rune_utxos: &[Utxo],
    rune_amount: u128,
    btc_out: u64,
) -> Result<SwapTx, BuildError> {
    debug!(pool = %pool.address, rune_amount, btc_out, "building rune->btc swap");

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_addr = parse_address(&pool.address, ctx.network)?;

    let selection = select_rune_utxos(rune_utxos, pool.coin_id, rune_amount);
    if selection.total < rune_amount {
        return Err(BuildError::InsufficientRuneUtxo);
    }
    let plan = plan_rune_change(&selection.selected, pool.coin_id, rune_amount)?;

    let pool_btc = pool
        .btc_reserve()
        .checked_sub(btc_out)
        .ok_or(BuildError::Math)?;
    let pool_runes = pool
        .rune_reserve()
        .checked_add(rune_amount)
        .ok_or(BuildError::Math)?;

    let mut assembler = TxAssembler::new(ctx.enable_rbf);
    for utxo in &pool.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }
    for utxo in &selection.selected {
        assembler.push_input(utxo.clone(), InputOwner::User);
    }

    let mut edicts = Vec::new();
    if plan.need_change() {
        let change_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
        edicts.extend(change_edicts(&plan, pool.coin_id, change_index)?);
    }
    let pool_index = assembler.push_output(pool_addr.script_pubkey(), pool_btc);
    edicts.push(Edict {
        id: rune_id(pool.coin_id)?,
        amount: pool_runes,
        output: pool_index,
    });
    assembler.push_output(user.script_pubkey(), btc_out);
    assembler.push_op_return(encode_runestone(edicts));

    let tx = fund_and_finalize(assembler, ctx, &user, vec![pool.address.clone()]).await?;

    let intention = swap_intention(
        &pool.address,
        pool.nonce,
        pool.spent_outpoints(),
        vec![format!("{}:{}", tx.txid, pool_index)],
        vec![InputCoin {
            coin: CoinBalance::new(pool.coin_id, rune_amount),
            from: ctx.wallet.address.clone(),
        }],
        vec![OutputCoin {
            coin: CoinBalance::btc(btc_out),
            to: ctx.wallet.address.clone(),
        }],
    );

    Ok(SwapTx {
        tx,
        intentions: vec![intention],
    })
}

/// Builds a dual-hop swap: leg 0 sells `rune_a_amount` of pool A's rune into
/// pool A for `btc_intermediate` satoshis; leg 1 spends that same amount
/// into pool B for the quoted `rune_b_out`. One transaction, one runestone,
/// two intentions sharing the pre-signing txid.
///
/// Routes longer than two legs are out of scope; the API takes exactly two
/// pool snapshots.
pub async fn build_swap_rune_to_rune(
    ctx: &BuildContext<'_>,
    pool_a: &PoolSnapshot,
    pool_b: &PoolSnapshot,
    rune_utxos: &[Utxo],
    rune_a_amount: u128,
    btc_intermediate: u64,
    rune_b_out: u128,
) -> Result<SwapTx, BuildError> {
    debug!(
        pool_a = %pool_a.address,
        pool_b = %pool_b.address,
        rune_a_amount,
        btc_intermediate,
        rune_b_out,
        "building rune->rune swap"
    );

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_a_addr = parse_address(&pool_a.address, ctx.network)?;
    let pool_b_addr = parse_address(&pool_b.address, ctx.network)?;

    let selection = select_rune_utxos(rune_utxos, pool_a.coin_id, rune_a_amount);
    if selection.total < rune_a_amount {
        return Err(BuildError::InsufficientRuneUtxo);
    }
    let plan = plan_rune_change(&selection.selected, pool_a.coin_id, rune_a_amount)?;

    let pool_a_btc = pool_a
        .btc_reserve()
        .checked_sub(btc_intermediate)
        .ok_or(BuildError::Math)?;
    let pool_a_runes = pool_a
        .rune_reserve()
        .checked_add(rune_a_amount)
        .ok_or(BuildError::Math)?;
    let pool_b_btc = pool_b
        .btc_reserve()
        .checked_add(btc_intermediate)
        .ok_or(BuildError::Math)?;
    let pool_b_remaining = pool_b
        .rune_reserve()
        .checked_sub(rune_b_out)
        .ok_or(BuildError::Math)?;

    let mut assembler = TxAssembler::new(ctx.enable_rbf);
    for utxo in &pool_a.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }
    for utxo in &pool_b.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }
    for utxo in &selection.selected {
        assembler.push_input(utxo.clone(), InputOwner::User);
    }

    let mut edicts = Vec::new();
    if plan.need_change() {
        let change_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
        edicts.extend(change_edicts(&plan, pool_a.coin_id, change_index)?);
    }
    let pool_b_index = assembler.push_output(pool_b_addr.script_pubkey(), pool_b_btc);
    if pool_b_remaining > 0 {
        edicts.push(Edict {
            id: rune_id(pool_b.coin_id)?,
            amount: pool_b_remaining,
            output: pool_b_index,
        });
    }
    let pool_a_index = assembler.push_output(pool_a_addr.script_pubkey(), pool_a_btc);
    edicts.push(Edict {
        id: rune_id(pool_a.coin_id)?,
        amount: pool_a_runes,
        output: pool_a_index,
    });
    let user_b_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
    edicts.push(Edict {
        id: rune_id(pool_b.coin_id)?,
        amount: rune_b_out,
        output: user_b_index,
    });
    assembler.push_op_return(encode_runestone(edicts));

    let tx = fund_and_finalize(
        assembler,
        ctx,
        &user,
        vec![pool_a.address.clone(), pool_b.address.clone()],
    )
    .await?;

    // Each leg references the BTC hop between the two pool addresses as its
    // connecting coin.
    let leg_a = swap_intention(
        &pool_a.address,
        pool_a.nonce,
        pool_a.spent_outpoints(),
        vec![format!("{}:{}", tx.txid, pool_a_index)],
        vec![InputCoin {
            coin: CoinBalance::new(pool_a.coin_id, rune_a_amount),
            from: ctx.wallet.address.clone(),
        }],
        vec![OutputCoin {
            coin: CoinBalance::btc(btc_intermediate),
            to: pool_b.address.clone(),
        }],
    );
    let leg_b = swap_intention(
        &pool_b.address,
        pool_b.nonce,
        pool_b.spent_outpoints(),
        vec![format!("{}:{}", tx.txid, pool_b_index)],
        vec![InputCoin {
            coin: CoinBalance::btc(btc_intermediate),
            from: pool_a.address.clone(),
        }],
        vec![OutputCoin {
            coin: CoinBalance::new(pool_b.coin_id, rune_b_out),
            to: ctx.wallet.address.clone(),
        }],
    );

    Ok(SwapTx {
        tx,
        intentions: vec![leg_a, leg_b],
    })
}
