use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::CoinBalance;

/// Exchange identifier stamped on every intention this client produces.
pub const EXCHANGE_ID: &str = "RUNESWAP";

/// Action tags understood by the exchange.
pub mod action {
    pub const SWAP: &str = "swap";
    pub const ADD_LIQUIDITY: &str = "add_liquidity";
    pub const WITHDRAW_LIQUIDITY: &str = "withdraw_liquidity";
    pub const DONATE: &str = "donate";
}

/// A coin amount leaving the named address and entering the exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCoin {
    pub coin: CoinBalance,
    pub from: String,
}

/// A coin amount leaving the exchange toward the named address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCoin {
    pub coin: CoinBalance,
    pub to: String,
}

/// Economic effect of one pool leg, submitted to the orchestrator after
/// signing.
///
/// `pool_utxo_spent` lists the consumed pool outpoints as `"txid:vout"`;
/// `pool_utxo_received` lists the produced ones against the *pre-signing*
/// transaction id. `nonce` must be the exact value the pool state was read
/// at; the exchange rejects the transaction if the pool has moved on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intention {
    pub exchange_id: String,
    pub action: String,
    pub action_params: String,
    pub pool_address: String,
    pub nonce: u64,
    pub pool_utxo_spent: Vec<String>,
    pub pool_utxo_received: Vec<String>,
    pub input_coins: Vec<InputCoin>,
    pub output_coins: Vec<OutputCoin>,
}

/// Everything the orchestrator's `invoke` call needs besides the signed
/// transaction itself.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentionSet {
    pub initiator_address: String,
    #[serde_as(as = "DisplayFromStr")]
    pub tx_fee_in_sats: u64,
    pub intentions: Vec<Intention>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoinBalance, CoinId};

    fn sample_intention() -> Intention {
        Intention {
            exchange_id: EXCHANGE_ID.to_string(),
            action: action::SWAP.to_string(),
            action_params: String::new(),
            pool_address: "bc1p5d7rjq7g6rdk2yhzks9smlaqtedr4dekq08ge8ztwac72sfr9rusxg3297"
                .to_string(),
            nonce: 7,
            pool_utxo_spent: vec![
                "1111111111111111111111111111111111111111111111111111111111111111:0"
                    .to_string(),
            ],
            pool_utxo_received: vec![
                "2222222222222222222222222222222222222222222222222222222222222222:1"
                    .to_string(),
            ],
            input_coins: vec![InputCoin {
                coin: CoinBalance::btc(50_000),
                from: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
            }],
            output_coins: vec![OutputCoin {
                coin: CoinBalance::new(CoinId::rune(840_000, 12), 99),
                to: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
            }],
        }
    }

    #[test]
    fn intention_wire_shape() {
        let json = serde_json::to_value(sample_intention()).unwrap();
        assert_eq!(json["exchange_id"], "RUNESWAP");
        assert_eq!(json["action"], "swap");
        assert_eq!(json["nonce"], 7);
        assert_eq!(json["input_coins"][0]["coin"]["id"], "0:0");
        assert_eq!(json["input_coins"][0]["coin"]["value"], "50000");
        assert_eq!(json["output_coins"][0]["coin"]["id"], "840000:12");
    }

    #[test]
    fn intention_set_round_trips() {
        let set = IntentionSet {
            initiator_address: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
            tx_fee_in_sats: 1234,
            intentions: vec![sample_intention()],
        };
        let json = serde_json::to_string(&set).unwrap();
        let back: IntentionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(json.contains("\"tx_fee_in_sats\":\"1234\""));
    }
}
