//! Wire-level data model shared between the runeswap transaction builder and
//! the exchange orchestrator.
//!
//! Everything in this crate serializes exactly the way the indexer and the
//! orchestrator expect it: satoshi and rune amounts travel as decimal strings
//! (JavaScript callers cannot hold them losslessly as numbers), coin ids as
//! `"block:tx"`, and pool outpoints as `"txid:vout"`.

mod address;
mod coin;
mod intention;
mod utxo;

pub use address::AddressType;
pub use coin::{CoinBalance, CoinId, ParseCoinIdError};
pub use intention::{action, InputCoin, Intention, IntentionSet, OutputCoin, EXCHANGE_ID};
pub use utxo::Utxo;
