use ordinals::Edict;
use runeswap_types::{action, CoinBalance, OutputCoin};
use tracing::debug;

use crate::address::parse_address;
use crate::assemble::{InputOwner, TxAssembler};
use crate::constants::DUST_LIMIT;
use crate::edict::{encode_runestone, rune_id};
use crate::error::BuildError;
use crate::ops::{fund_and_finalize, BuildContext, PoolOpTx};
use crate::pool::PoolSnapshot;

/// Builds a withdraw-liquidity transaction moving `btc_amount` satoshis and
/// `rune_amount` units from the pool back to the user.
///
/// Inputs: pool utxos, then fee inputs from convergence. Outputs: optional
/// pool change (whatever reserves remain), the user's rune-receiving dust
/// output, the user's BTC-receiving output, the runestone, optional payer
/// change. Draining the pool completely leaves no pool-change output.
pub async fn build_withdraw(
    ctx: &BuildContext<'_>,
    pool: &PoolSnapshot,
    btc_amount: u64,
    rune_amount: u128,
) -> Result<PoolOpTx, BuildError> {
    debug!(pool = %pool.address, btc_amount, rune_amount, "building withdraw");

    let user = parse_address(&ctx.wallet.address, ctx.network)?;
    let pool_addr = parse_address(&pool.address, ctx.network)?;

    let remaining_btc = pool
        .btc_reserve()
        .checked_sub(btc_amount)
        .ok_or(BuildError::Math)?;
    let remaining_rune = pool
        .rune_reserve()
        .checked_sub(rune_amount)
        .ok_or(BuildError::Math)?;

    let mut assembler = TxAssembler::new(ctx.enable_rbf);
    for utxo in &pool.utxos {
        assembler.push_input(utxo.clone(), InputOwner::Pool);
    }

    let mut edicts = Vec::new();
    let need_pool_change = remaining_btc > 0 || remaining_rune > 0;
    let mut pool_change_index = None;
    if need_pool_change {
        let index = assembler.push_output(pool_addr.script_pubkey(), remaining_btc);
        if remaining_rune > 0 {
            edicts.push(Edict {
                id: rune_id(pool.coin_id)?,
                amount: remaining_rune,
                output: index,
            });
        }
        pool_change_index = Some(index);
    }

    let rune_index = assembler.push_output(user.script_pubkey(), DUST_LIMIT);
    if rune_amount > 0 {
        edicts.push(Edict {
            id: rune_id(pool.coin_id)?,
            amount: rune_amount,
            output: rune_index,
        });
    }
    assembler.push_output(user.script_pubkey(), btc_amount);
    assembler.push_op_return(encode_runestone(edicts));

    let tx = fund_and_finalize(assembler, ctx, &user, vec![pool.address.clone()]).await?;

    Ok(PoolOpTx {
        action: action::WITHDRAW_LIQUIDITY,
        pool_address: pool.address.clone(),
        nonce: pool.nonce,
        pool_utxo_spent: pool.spent_outpoints(),
        pool_utxo_received: pool_change_index
            .map(|index| vec![format!("{}:{}", tx.txid, index)])
            .unwrap_or_default(),
        input_coins: Vec::new(),
        output_coins: vec![
            OutputCoin {
                coin: CoinBalance::btc(btc_amount),
                to: ctx.wallet.address.clone(),
            },
            OutputCoin {
                coin: CoinBalance::new(pool.coin_id, rune_amount),
                to: ctx.wallet.address.clone(),
            },
        ],
        tx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests::{assert_conserved, context, decoded_edicts, shape_estimator};
    use crate::test_support::pool_snapshot;

    #[tokio::test]
    async fn partial_withdraw_keeps_a_pool_change_output() {
        let estimator = shape_estimator();
        let ctx = context(&estimator);
        let pool = pool_snapshot(1_000_000, 2_000, 5);

        let built = build_withdraw(&ctx, &pool, 250_000, 500).await.unwrap();

        // Output 0: pool change; output 1: user rune dust; output 2: user
        // btc; output 3: runestone.
        assert_eq!(built.tx.tx.output[0].value.to_sat(), 750_000);
        assert_eq!(built.tx.tx.output[1].value.to_sat(), DUST_LIMIT);
        assert_eq!(built.tx.tx.output[2].value.to_sat(), 250_000);
        assert_eq!(decoded_edicts(&built.tx.tx), vec![(0, 1_500), (1, 500)]);
        assert_eq!(built.pool_utxo_received, vec![format!("{}:0", built.tx.txid)]);
        assert_conserved(&built.tx, pool.btc_reserve());
    }

    #[tokio::test]
    async fn draining_withdraw_leaves_no_pool_change() {
        let estimator = shape_estimator();
        let ctx = context(&estimator);
        let pool = pool_snapshot(1_000_000, 2_000, 5);

        let built = build_withdraw(&ctx, &pool, 1_000_000, 2_000).await.unwrap();

        assert!(built.pool_utxo_received.is_empty());
        // The rune receipt moves to the front; its edict follows it.
        assert_eq!(built.tx.tx.output[0].value.to_sat(), DUST_LIMIT);
        assert_eq!(built.tx.tx.output[1].value.to_sat(), 1_000_000);
        assert_eq!(decoded_edicts(&built.tx.tx), vec![(0, 2_000)]);
        assert_conserved(&built.tx, pool.btc_reserve());
    }

    #[tokio::test]
    async fn over_withdraw_is_a_math_error() {
        let estimator = shape_estimator();
        let ctx = context(&estimator);
        let pool = pool_snapshot(1_000_000, 2_000, 5);

        let err = build_withdraw(&ctx, &pool, 2_000_000, 500).await.unwrap_err();
        assert!(matches!(err, BuildError::Math));
    }

    #[tokio::test]
    async fn withdraw_reports_receipts_not_spends() {
        let estimator = shape_estimator();
        let ctx = context(&estimator);
        let pool = pool_snapshot(1_000_000, 2_000, 5);

        let built = build_withdraw(&ctx, &pool, 250_000, 500).await.unwrap();
        assert!(built.input_coins.is_empty());
        assert_eq!(built.output_coins.len(), 2);
        assert_eq!(built.intention().action, "withdraw_liquidity");
        assert_eq!(built.intention().nonce, 5);
    }
}
