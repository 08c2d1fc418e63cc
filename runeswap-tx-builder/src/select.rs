use std::collections::HashSet;

use runeswap_types::{CoinId, Utxo};

/// Result of a greedy BTC selection pass.
#[derive(Clone, Debug, Default)]
pub struct BtcSelection {
    pub selected: Vec<Utxo>,
    pub remaining: Vec<Utxo>,
    pub total_sats: u64,
}

/// Result of a greedy rune selection pass.
#[derive(Clone, Debug, Default)]
pub struct RuneSelection {
    pub selected: Vec<Utxo>,
    pub remaining: Vec<Utxo>,
    pub total: u128,
}

/// Greedily takes BTC-only outputs, in their given order, until `target`
/// satoshis are covered.
///
/// Rune-bearing outputs are never candidates: spending one as a plain fee
/// input would burn its balances. No best-fit optimization happens here;
/// identical input lists must select identical sets.
///
/// Running out of candidates is not an error at this level. Callers compare
/// `total_sats` against the target and surface the typed exhaustion error.
pub fn select_btc_utxos(utxos: &[Utxo], target: u64) -> BtcSelection {
    let mut selection = BtcSelection::default();
    for utxo in utxos {
        if !utxo.is_btc_only() || selection.total_sats >= target {
            selection.remaining.push(utxo.clone());
            continue;
        }
        selection.total_sats += utxo.sats;
        selection.selected.push(utxo.clone());
    }
    selection
}

/// Greedily takes outputs carrying the given rune, in their given order,
/// until `target` units are covered. Duplicate outpoints in the candidate
/// list are skipped.
pub fn select_rune_utxos(utxos: &[Utxo], coin: CoinId, target: u128) -> RuneSelection {
    let mut selection = RuneSelection::default();
    let mut seen = HashSet::new();
    for utxo in utxos {
        if !seen.insert(utxo.outpoint()) {
            continue;
        }
        let amount = utxo.rune_value(coin);
        if amount == 0 || selection.total >= target {
            selection.remaining.push(utxo.clone());
            continue;
        }
        selection.total += amount;
        selection.selected.push(utxo.clone());
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{btc_utxo, rune_utxo, RUNE};

    mod btc {
        use super::*;

        #[test]
        fn accumulates_in_given_order_until_covered() {
            let utxos = vec![btc_utxo(1, 5_000), btc_utxo(2, 8_000), btc_utxo(3, 12_000)];
            let selection = select_btc_utxos(&utxos, 10_000);
            assert_eq!(selection.selected.len(), 2);
            assert_eq!(selection.total_sats, 13_000);
            assert_eq!(selection.selected[0].txid, utxos[0].txid);
            assert_eq!(selection.remaining.len(), 1);
        }

        #[test]
        fn skips_rune_bearing_outputs() {
            let utxos = vec![
                rune_utxo(1, 50_000, RUNE, 10),
                btc_utxo(2, 3_000),
                btc_utxo(3, 3_000),
            ];
            let selection = select_btc_utxos(&utxos, 4_000);
            assert_eq!(selection.selected.len(), 2);
            assert!(selection.selected.iter().all(Utxo::is_btc_only));
            assert_eq!(selection.total_sats, 6_000);
        }

        #[test]
        fn exhaustion_returns_partial_set() {
            let utxos = vec![btc_utxo(1, 1_000), btc_utxo(2, 1_000)];
            let selection = select_btc_utxos(&utxos, 10_000);
            assert_eq!(selection.selected.len(), 2);
            assert_eq!(selection.total_sats, 2_000);
            assert!(selection.total_sats < 10_000);
        }

        #[test]
        fn zero_target_selects_nothing() {
            let utxos = vec![btc_utxo(1, 1_000)];
            let selection = select_btc_utxos(&utxos, 0);
            assert!(selection.selected.is_empty());
            assert_eq!(selection.remaining.len(), 1);
        }
    }

    mod rune {
        use super::*;
        use runeswap_types::CoinId;

        #[test]
        fn accumulates_matching_rune_only() {
            let other = CoinId::rune(900_000, 1);
            let utxos = vec![
                rune_utxo(1, 546, other, 400),
                rune_utxo(2, 546, RUNE, 300),
                rune_utxo(3, 546, RUNE, 300),
            ];
            let selection = select_rune_utxos(&utxos, RUNE, 500);
            assert_eq!(selection.selected.len(), 2);
            assert_eq!(selection.total, 600);
        }

        #[test]
        fn deduplicates_by_outpoint() {
            let utxo = rune_utxo(1, 546, RUNE, 300);
            let utxos = vec![utxo.clone(), utxo];
            let selection = select_rune_utxos(&utxos, RUNE, 600);
            assert_eq!(selection.selected.len(), 1);
            assert_eq!(selection.total, 300);
        }

        #[test]
        fn exhaustion_returns_partial_set() {
            let utxos = vec![rune_utxo(1, 546, RUNE, 100)];
            let selection = select_rune_utxos(&utxos, RUNE, 500);
            assert_eq!(selection.total, 100);
            assert!(selection.total < 500);
        }
    }
}
