use std::fmt;

use bitcoin::{OutPoint, Txid};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{AddressType, CoinBalance, CoinId};

/// A spendable output as reported by the indexer, together with any rune
/// balances it carries.
///
/// An output with an empty `coins` list is BTC-only and may be spent for fee
/// or value purposes; an output carrying rune balances must only ever be
/// spent through the rune selector so its balances get re-allocated by an
/// edict.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    #[serde_as(as = "DisplayFromStr")]
    pub txid: Txid,
    pub vout: u32,
    /// Value in satoshis. String-encoded on the wire.
    #[serde_as(as = "DisplayFromStr")]
    pub sats: u64,
    /// Owning address.
    pub address: String,
    pub address_type: AddressType,
    /// Compressed public key hex; required for signing non-taproot inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Rune balances attached to this output.
    #[serde(default)]
    pub coins: Vec<CoinBalance>,
}

impl Utxo {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }

    pub fn is_btc_only(&self) -> bool {
        self.coins.is_empty()
    }

    /// Units of the given rune carried by this output.
    pub fn rune_value(&self, id: CoinId) -> u128 {
        self.coins
            .iter()
            .filter(|c| c.id == id)
            .map(|c| c.value)
            .sum()
    }
}

impl fmt::Display for Utxo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}
