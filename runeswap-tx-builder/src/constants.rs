/// Smallest output value the network relays. Also the placeholder value for
/// outputs whose purpose is carrying a rune balance rather than BTC.
pub const DUST_LIMIT: u64 = 546;

/// Added on top of every external fee quote so a one-satoshi rounding
/// difference in the estimator never produces an underpaying transaction.
pub const FEE_SAFETY_MARGIN: u64 = 1;
