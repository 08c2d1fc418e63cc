//! Client-side transaction construction for the runeswap exchange.
//!
//! Every state change against a pool — swap, deposit, withdraw, donate — is
//! expressed as an unsigned Bitcoin transaction moving BTC and rune balances
//! between the user's wallet and the pool's on-chain utxo, annotated with a
//! runestone describing the rune transfers. This crate owns the parts where
//! correctness is unforgiving: utxo selection, edict construction, the
//! fee/utxo fixed-point loop, and the per-operation assembly of inputs and
//! outputs whose *order* is part of the protocol semantics.
//!
//! External collaborators stay outside: the fee estimator is injected as a
//! [`FeeEstimator`] capability, signing belongs to the wallet extension (fed
//! by [`ToSignInput`] descriptors), and pool pricing/nonce state arrives as a
//! caller-provided [`PoolSnapshot`]. The builders mutate nothing anywhere;
//! abandoning a build before signing has no side effects.
//!
//! ```no_run
//! # use runeswap_tx_builder::*;
//! # async fn example(ctx: BuildContext<'_>, pool: PoolSnapshot) -> Result<(), BuildError> {
//! let swap = build_swap_btc_to_rune(&ctx, &pool, 50_000, 990).await?;
//! // Hand swap.tx.psbt_hex() to the wallet for signing, then submit the
//! // signed transaction together with swap.intentions to the orchestrator.
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod assemble;
pub mod constants;
pub mod edict;
pub mod error;
pub mod fee;
pub mod ops;
pub mod pool;
pub mod select;
pub mod vsize;

#[cfg(test)]
pub(crate) mod test_support;

pub use address::p2tr_address_and_script;
pub use assemble::{AssembledTx, InputOwner, ToSignInput, TxAssembler};
pub use constants::DUST_LIMIT;
pub use error::BuildError;
pub use fee::{converge, Converged, ConvergeRequest, FeeEstimator, OutputShape};
pub use ops::{
    build_deposit, build_donate, build_swap_btc_to_rune, build_swap_rune_to_btc,
    build_swap_rune_to_rune, build_withdraw, intention_set, BuildContext, PoolOpTx, SwapTx,
    WalletContext,
};
pub use pool::PoolSnapshot;
pub use select::{select_btc_utxos, select_rune_utxos, BtcSelection, RuneSelection};
