use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

/// Identity of a transferable asset.
///
/// `0:0` is BTC itself; any other `block:tx` pair names the rune etched in
/// that transaction. The ordering matters: runestone payloads are delta
/// encoded over ids sorted ascending.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CoinId {
    pub block: u64,
    pub tx: u32,
}

impl CoinId {
    pub const fn btc() -> Self {
        Self { block: 0, tx: 0 }
    }

    pub const fn rune(block: u64, tx: u32) -> Self {
        Self { block, tx }
    }

    pub fn is_btc(&self) -> bool {
        self.block == 0 && self.tx == 0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.tx)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid coin id: {0}")]
pub struct ParseCoinIdError(pub String);

impl FromStr for CoinId {
    type Err = ParseCoinIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (block, tx) = s
            .split_once(':')
            .ok_or_else(|| ParseCoinIdError(s.to_string()))?;
        let block = block
            .parse::<u64>()
            .map_err(|_| ParseCoinIdError(s.to_string()))?;
        let tx = tx
            .parse::<u32>()
            .map_err(|_| ParseCoinIdError(s.to_string()))?;
        Ok(Self { block, tx })
    }
}

impl TryFrom<String> for CoinId {
    type Error = ParseCoinIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CoinId> for String {
    fn from(id: CoinId) -> String {
        id.to_string()
    }
}

/// An amount of one coin, in indivisible base units (satoshis for BTC,
/// rune units otherwise). Never a float.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinBalance {
    pub id: CoinId,
    #[serde_as(as = "DisplayFromStr")]
    pub value: u128,
}

impl CoinBalance {
    pub fn new(id: CoinId, value: u128) -> Self {
        Self { id, value }
    }

    pub fn btc(sats: u64) -> Self {
        Self {
            id: CoinId::btc(),
            value: sats as u128,
        }
    }
}
