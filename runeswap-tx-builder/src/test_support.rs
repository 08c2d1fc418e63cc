//! Shared fixtures and stub estimators for the crate's unit tests.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::Txid;
use runeswap_types::{AddressType, CoinBalance, CoinId, Utxo};

use crate::fee::{FeeEstimator, OutputShape};
use crate::pool::PoolSnapshot;

pub(crate) const USER_ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
pub(crate) const POOL_ADDRESS: &str =
    "bc1p5d7rjq7g6rdk2yhzks9smlaqtedr4dekq08ge8ztwac72sfr9rusxg3297";
pub(crate) const WRAPPED_ADDRESS: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";
/// Compressed secp256k1 generator point; any valid point works for tests.
pub(crate) const USER_PUBKEY: &str =
    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

pub(crate) const RUNE: CoinId = CoinId::rune(840_000, 12);
pub(crate) const RUNE_B: CoinId = CoinId::rune(845_000, 3);

pub(crate) fn txid(n: u64) -> Txid {
    Txid::from_str(&format!("{n:064x}")).unwrap()
}

pub(crate) fn btc_utxo(n: u64, sats: u64) -> Utxo {
    Utxo {
        txid: txid(n),
        vout: 0,
        sats,
        address: USER_ADDRESS.to_string(),
        address_type: AddressType::P2wpkh,
        public_key: Some(USER_PUBKEY.to_string()),
        coins: Vec::new(),
    }
}

pub(crate) fn rune_utxo(n: u64, sats: u64, coin: CoinId, amount: u128) -> Utxo {
    Utxo {
        coins: vec![CoinBalance::new(coin, amount)],
        ..btc_utxo(n, sats)
    }
}

pub(crate) fn wrapped_utxo(n: u64, sats: u64) -> Utxo {
    Utxo {
        address: WRAPPED_ADDRESS.to_string(),
        address_type: AddressType::P2shP2wpkh,
        ..btc_utxo(n, sats)
    }
}

pub(crate) fn pool_utxo(n: u64, sats: u64, coin: CoinId, amount: u128) -> Utxo {
    Utxo {
        txid: txid(n),
        vout: 0,
        sats,
        address: POOL_ADDRESS.to_string(),
        address_type: AddressType::P2tr,
        public_key: None,
        coins: if amount > 0 {
            vec![CoinBalance::new(coin, amount)]
        } else {
            Vec::new()
        },
    }
}

pub(crate) fn pool_snapshot(btc: u64, rune: u128, nonce: u64) -> PoolSnapshot {
    PoolSnapshot {
        address: POOL_ADDRESS.to_string(),
        nonce,
        coin_id: RUNE,
        utxos: vec![pool_utxo(1_000 + nonce, btc, RUNE, rune)],
    }
}

/// Returns quotes from a fixed script, repeating the last one once the
/// script runs dry so every loop eventually sees a stable quote.
pub(crate) struct ScriptedEstimator {
    quotes: Mutex<VecDeque<u64>>,
}

impl ScriptedEstimator {
    pub(crate) fn new(quotes: impl IntoIterator<Item = u64>) -> Self {
        let quotes: VecDeque<u64> = quotes.into_iter().collect();
        assert!(!quotes.is_empty(), "scripted estimator needs at least one quote");
        Self {
            quotes: Mutex::new(quotes),
        }
    }
}

#[async_trait]
impl FeeEstimator for ScriptedEstimator {
    async fn estimate_min_tx_fee(
        &self,
        _input_types: &[AddressType],
        _pool_addresses: &[String],
        _output_shapes: &[OutputShape],
    ) -> anyhow::Result<u64> {
        let mut quotes = self.quotes.lock().unwrap();
        Ok(if quotes.len() > 1 {
            quotes.pop_front().unwrap()
        } else {
            *quotes.front().unwrap()
        })
    }
}

/// Fee grows linearly with the declared shape, like the real service.
pub(crate) struct ShapeEstimator {
    pub base: u64,
    pub per_input: u64,
    pub per_output: u64,
}

#[async_trait]
impl FeeEstimator for ShapeEstimator {
    async fn estimate_min_tx_fee(
        &self,
        input_types: &[AddressType],
        _pool_addresses: &[String],
        output_shapes: &[OutputShape],
    ) -> anyhow::Result<u64> {
        Ok(self.base
            + self.per_input * input_types.len() as u64
            + self.per_output * output_shapes.len() as u64)
    }
}

/// Always fails, for exercising the fatal-estimator path.
pub(crate) struct FailingEstimator;

#[async_trait]
impl FeeEstimator for FailingEstimator {
    async fn estimate_min_tx_fee(
        &self,
        _input_types: &[AddressType],
        _pool_addresses: &[String],
        _output_shapes: &[OutputShape],
    ) -> anyhow::Result<u64> {
        anyhow::bail!("fee service unavailable")
    }
}
