use runeswap_types::{CoinId, Utxo};

/// A pool's on-chain state as read from the exchange.
///
/// The snapshot is trusted as-is: the builder has no way to verify that the
/// nonce is still current, it only guarantees the nonce is echoed verbatim
/// into every intention built against this state. A competing transaction
/// landing first invalidates this one at the exchange, not here.
#[derive(Clone, Debug)]
pub struct PoolSnapshot {
    pub address: String,
    pub nonce: u64,
    /// The non-BTC side of this pool.
    pub coin_id: CoinId,
    /// Current pool outputs; at most one in steady state.
    pub utxos: Vec<Utxo>,
}

impl PoolSnapshot {
    pub fn btc_reserve(&self) -> u64 {
        self.utxos.iter().map(|u| u.sats).sum()
    }

    pub fn rune_reserve(&self) -> u128 {
        self.utxos.iter().map(|u| u.rune_value(self.coin_id)).sum()
    }

    /// `txid:vout` list for an intention's `pool_utxo_spent` field.
    pub fn spent_outpoints(&self) -> Vec<String> {
        self.utxos.iter().map(|u| u.to_string()).collect()
    }
}
