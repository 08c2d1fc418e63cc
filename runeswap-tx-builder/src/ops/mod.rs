//! Operation builders.
//!
//! Each operation is a linear pipeline over the same primitives: commit the
//! fixed inputs and outputs, run the fee-convergence loop, extend the
//! transaction with the selected payer inputs and change, finalize. Inputs
//! and outputs are append-only throughout; the order they are committed in
//! is the order the edicts and the pre-signing txid are derived from.
//!
//! Builders are plain async functions with no shared state: two concurrent
//! calls never observe each other, and calling one twice over identical
//! inputs (same utxo sets, same estimator responses) produces byte-identical
//! unsigned transactions. Nothing external is mutated here; marking utxos
//! spent is the caller's job, after signing.

mod deposit;
mod donate;
mod swap;
mod withdraw;

pub use deposit::build_deposit;
pub use donate::build_donate;
pub use swap::{build_swap_btc_to_rune, build_swap_rune_to_btc, build_swap_rune_to_rune};
pub use withdraw::build_withdraw;

use bitcoin::{Address, Network};
use runeswap_types::{
    action, AddressType, InputCoin, Intention, IntentionSet, OutputCoin, Utxo, EXCHANGE_ID,
};

use crate::assemble::{AssembledTx, InputOwner, TxAssembler};
use crate::error::BuildError;
use crate::fee::{converge, ConvergeRequest, FeeEstimator};

/// The user's wallet as the operation builders see it.
#[derive(Clone, Debug)]
pub struct WalletContext {
    /// Receives rune outputs and change; pays fees.
    pub address: String,
    /// Spendable BTC-only utxos, in wallet order.
    pub btc_utxos: Vec<Utxo>,
}

/// Per-invocation dependencies, passed explicitly instead of living in
/// ambient singletons.
pub struct BuildContext<'a> {
    pub network: Network,
    pub estimator: &'a dyn FeeEstimator,
    /// Target rate in sats/vbyte; only cross-checked locally, the estimator
    /// owns the authoritative quote.
    pub fee_rate: f64,
    pub enable_rbf: bool,
    pub wallet: WalletContext,
}

/// Outcome of a deposit, withdraw or donate build.
#[derive(Clone, Debug)]
pub struct PoolOpTx {
    pub tx: AssembledTx,
    pub action: &'static str,
    pub pool_address: String,
    pub nonce: u64,
    pub pool_utxo_spent: Vec<String>,
    pub pool_utxo_received: Vec<String>,
    pub input_coins: Vec<InputCoin>,
    pub output_coins: Vec<OutputCoin>,
}

impl PoolOpTx {
    /// The single intention this operation submits.
    pub fn intention(&self) -> Intention {
        Intention {
            exchange_id: EXCHANGE_ID.to_string(),
            action: self.action.to_string(),
            action_params: String::new(),
            pool_address: self.pool_address.clone(),
            nonce: self.nonce,
            pool_utxo_spent: self.pool_utxo_spent.clone(),
            pool_utxo_received: self.pool_utxo_received.clone(),
            input_coins: self.input_coins.clone(),
            output_coins: self.output_coins.clone(),
        }
    }
}

/// Outcome of a swap build. Single-pool swaps carry one intention; the
/// dual-hop rune-to-rune swap carries one per pool leg, sharing the txid.
#[derive(Clone, Debug)]
pub struct SwapTx {
    pub tx: AssembledTx,
    pub intentions: Vec<Intention>,
}

/// Packs intentions for the orchestrator's `invoke` call.
pub fn intention_set(
    initiator_address: &str,
    tx_fee_in_sats: u64,
    intentions: Vec<Intention>,
) -> IntentionSet {
    IntentionSet {
        initiator_address: initiator_address.to_string(),
        tx_fee_in_sats,
        intentions,
    }
}

fn swap_intention(
    pool_address: &str,
    nonce: u64,
    pool_utxo_spent: Vec<String>,
    pool_utxo_received: Vec<String>,
    input_coins: Vec<InputCoin>,
    output_coins: Vec<OutputCoin>,
) -> Intention {
    Intention {
        exchange_id: EXCHANGE_ID.to_string(),
        action: action::SWAP.to_string(),
        action_params: String::new(),
        pool_address: pool_address.to_string(),
        nonce,
        pool_utxo_spent,
        pool_utxo_received,
        input_coins,
        output_coins,
    }
}

/// Runs the fee-convergence loop against the committed transaction, then
/// extends it with the selected payer inputs and change output and closes
/// the assembler.
async fn fund_and_finalize(
    mut assembler: TxAssembler,
    ctx: &BuildContext<'_>,
    payer: &Address,
    pool_addresses: Vec<String>,
) -> Result<AssembledTx, BuildError> {
    let payer_type = AddressType::classify(&ctx.wallet.address);
    if payer_type == AddressType::Unknown {
        return Err(BuildError::UnknownAddressType(ctx.wallet.address.clone()));
    }

    let converged = converge(ConvergeRequest {
        estimator: ctx.estimator,
        committed_inputs: assembler.input_types(),
        pool_addresses,
        committed_outputs: assembler.output_shapes(),
        economic_sats: assembler.economic_sats(),
        payer_type,
        candidates: &ctx.wallet.btc_utxos,
        fee_rate: ctx.fee_rate,
    })
    .await?;

    for utxo in &converged.selected {
        assembler.push_input(utxo.clone(), InputOwner::User);
    }
    if let Some(change) = converged.change {
        assembler.push_output(payer.script_pubkey(), change);
    }

    assembler.finalize(converged.fee)
}
