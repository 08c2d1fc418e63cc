use ordinals::Edict;
use runeswap_types::{action, CoinBalance, InputCoin, Utxo};
use tracing::debug;

use crate::address::parse_address;
use crate::assemble::{InputOwner, TxAssembler};
use crate::constants::DUST_LIMIT;
use crate::edict::{change_edicts, encode_runestone, plan_rune_change, rune_id};
use crate::error::BuildError;
use crate::ops::{fund_and_finalize, BuildContext, PoolOpTx};
use crate::pool::PoolSnapshot;
use crate::select::select_rune_utxos;

/// Builds an add-liquidity transaction moving `btc_amount` satoshis and
/// `rune_amount` units from the user into the pool.
///
/// Inputs: pool utxos, the selected user rune utxos, then whatever BTC the
/// convergence loop pulls in. Outputs: optional user rune change (dust),
/// the new pool output carrying both reserves plus the deposit, the
/// runestone, optional payer change.
pub async fn build_deposit(
    ctx: &BuildContext<'_>,
    pool: &PoolSnapshot,
    rune_utxos: &[Utxo],
    btc_amount: u64,
    rune_amount: u128,
) -> Result<PoolOpTx, BuildError> {
    debug!(pool = %pool.address, btc_amount, rune_amount, "building deposit");

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_addr = parse_address(&pool.address, ctx.network)?;

    let selection = select_rune_utxos(rune_utxos, pool.coin_id, rune_amount);
    if selection.total < rune_amount {
        return Err(BuildError::InsufficientRuneUtxo);
    }
    let plan = plan_rune_change(&selection.selected, pool.coin_id, rune_amount)?;

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

    let pool_btc = pool
        .btc_reserve()
        .checked_add(btc_amount)
        .ok_or(BuildError::Math)?;
    let pool_runes = pool
        .rune_reserve()
        .checked_add(rune_amount)
        .ok_or(BuildError::Math)?;
    let pool_index = assembler.push_output(pool_addr.script_pubkey(), pool_btc);
    edicts.push(Edict {
        id: rune_id(pool.coin_id)?,
        amount: pool_runes,
        output: pool_index,
    });
    assembler.push_op_return(encode_runestone(edicts));

    let tx = fund_and_finalize(assembler, ctx, &user, vec![pool.address.clone()]).await?;

    Ok(PoolOpTx {
        action: action::ADD_LIQUIDITY,
        pool_address: pool.address.clone(),
        nonce: pool.nonce,
        pool_utxo_spent: pool.spent_outpoints(),
        pool_utxo_received: vec![format!("{}:{}", tx.txid, pool_index)],
        input_coins: vec![
            InputCoin {
                coin: CoinBalance::btc(btc_amount),
                from: ctx.wallet.address.clone(),
            },
            InputCoin {
                coin: CoinBalance::new(pool.coin_id, rune_amount),
                from: ctx.wallet.address.clone(),
            },
        ],
        output_coins: Vec::new(),
        tx,
    })
}
