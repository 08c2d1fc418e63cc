use bitcoin::OutPoint;
use thiserror::Error;

/// Errors surfaced by the transaction builders.
///
/// None of these are retried internally; the fee-convergence loop is a
/// bounded fixed-point iteration, not error recovery. The UI layer owns
/// user-facing messaging and rolling back optimistic spent-UTXO marks.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("wallet does not hold enough BTC utxos to cover the target amount")]
    InsufficientBtcUtxo,

    #[error("wallet does not hold enough rune utxos to cover the transfer amount")]
    InsufficientRuneUtxo,

    #[error("fee estimator failed")]
    FeeEstimator(#[source] anyhow::Error),

    #[error("address has an unknown script type: {0}")]
    UnknownAddressType(String),

    #[error("missing public key for non-taproot input {0}")]
    MissingPublicKey(OutPoint),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid rune id: {0}")]
    InvalidRuneId(String),

    #[error("transaction outputs and fee do not balance against inputs")]
    InsufficientInputAmount,

    #[error("an arithmetic error occurred")]
    Math,

    #[error("psbt construction failed")]
    Psbt(#[from] bitcoin::psbt::Error),
}

impl BuildError {
    /// Stable machine-readable code, surfaced verbatim to callers.
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::InsufficientBtcUtxo => "INSUFFICIENT_BTC_UTXO",
            BuildError::InsufficientRuneUtxo => "insufficientUtxos",
            BuildError::FeeEstimator(_) => "FEE_ESTIMATOR_FAILED",
            BuildError::UnknownAddressType(_) => "UNKNOWN_ADDRESS_TYPE",
            BuildError::MissingPublicKey(_) => "MISSING_PUBLIC_KEY",
            BuildError::InvalidAddress(_) => "INVALID_ADDRESS",
            BuildError::InvalidRuneId(_) => "INVALID_RUNE_ID",
            BuildError::InsufficientInputAmount => "INSUFFICIENT_INPUT_AMOUNT",
            BuildError::Math => "MATH_ERROR",
            BuildError::Psbt(_) => "PSBT_ERROR",
        }
    }
}
