use ordinals::Edict;
use runeswap_types::{action, CoinBalance, InputCoin};
use tracing::debug;

use crate::address::parse_address;
use crate::assemble::{InputOwner, TxAssembler};
use crate::edict::{encode_runestone, rune_id};
use crate::error::BuildError;
use crate::ops::{fund_and_finalize, BuildContext, PoolOpTx};
use crate::pool::PoolSnapshot;

/// Builds a donation gifting `btc_amount` satoshis to the pool.
///
/// No rune enters or leaves the user's control: the pool output keeps the
/// full rune reserve (re-allocated by a single edict) and only its BTC side
/// grows.
pub async fn build_donate(
    ctx: &BuildContext<'_>,
    pool: &PoolSnapshot,
    btc_amount: u64,
) -> Result<PoolOpTx, BuildError> {
    debug!(pool = %pool.address, btc_amount, "building donate");

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_addr = parse_address(&pool.address, ctx.network)?;

    let pool_btc = pool
        .btc_reserve()
        .checked_add(btc_amount)
        .ok_or(BuildError::Math)?;
    let pool_runes = pool.rune_reserve();

    let mut assembler = TxAssembler::new(ctx.enable_rbf);
    for utxo in &pool.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }

    let pool_index = assembler.push_output(pool_addr.script_pubkey(), pool_btc);
    if pool_runes > 0 {
        assembler.push_op_return(encode_runestone(vec![Edict {
            id: rune_id(pool.coin_id)?,
            amount: pool_runes,
            output: pool_index,
        }]));
    }

    let tx = fund_and_finalize(assembler, ctx, &user, vec![pool.address.clone()]).await?;

    Ok(PoolOpTx {
        action: action::DONATE,
        pool_address: pool.address.clone(),
        nonce: pool.nonce,
        pool_utxo_spent: pool.spent_outpoints(),
        pool_utxo_received: vec![format!("{}:{}", tx.txid, pool_index)],
        input_coins: vec![InputCoin {
            coin: CoinBalance::btc(btc_amount),
            from: ctx.wallet.address.clone(),
        }],
        output_coins: Vec::new(),
        tx,
    })
}
