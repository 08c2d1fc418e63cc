//! Virtual-size table used to sanity-check remote fee quotes.
//!
//! The authoritative fee always comes from the injected [`FeeEstimator`];
//! these constants only back the local cross-check logged next to each quote.
//!
//! [`FeeEstimator`]: crate::fee::FeeEstimator

use runeswap_types::AddressType;

use crate::fee::OutputShape;

/// Non-witness bytes every input carries: outpoint (36), script-sig length
/// prefix (1), sequence (4).
const INPUT_BASE: u64 = 41;

/// Witness bytes of a p2wpkh spend: item count, signature push, signature,
/// pubkey push, pubkey. Discounted 4x as witness data.
const P2WPKH_WITNESS: u64 = 1 + 1 + 72 + 1 + 33;

/// Witness bytes of a key-path p2tr spend: item count, signature push,
/// schnorr signature.
const P2TR_WITNESS: u64 = 1 + 1 + 64;

/// Redeem-script push carried in the script-sig of a wrapped p2wpkh input;
/// non-witness, so not discounted.
const P2SH_P2WPKH_SCRIPT_SIG: u64 = 24;

/// Transaction frame: version, io counts, locktime, plus the shared segwit
/// marker overhead rounded up.
const TX_FRAME: u64 = 11;

/// Amount field plus script length prefix, shared by every output.
const OUTPUT_BASE: u64 = 8 + 1;

/// Virtual-size contribution of one input of the given type. `None` for
/// types this exchange never spends from.
pub fn input_vbytes(ty: AddressType) -> Option<u64> {
    match ty {
        AddressType::P2wpkh => Some(INPUT_BASE + P2WPKH_WITNESS / 4),
        AddressType::P2tr => Some(INPUT_BASE + P2TR_WITNESS / 4),
        AddressType::P2pkh => Some(INPUT_BASE + P2WPKH_WITNESS),
        AddressType::P2shP2wpkh => {
            Some(INPUT_BASE + P2SH_P2WPKH_SCRIPT_SIG + P2WPKH_WITNESS / 4)
        }
        AddressType::P2wsh | AddressType::P2sh | AddressType::Unknown => None,
    }
}

/// Virtual-size contribution of one output of the given shape.
pub fn output_vbytes(shape: &OutputShape) -> u64 {
    match shape {
        OutputShape::Standard(ty) => {
            let script = match ty {
                AddressType::P2wpkh => 22,
                AddressType::P2tr | AddressType::P2wsh => 34,
                AddressType::P2pkh => 25,
                AddressType::P2shP2wpkh | AddressType::P2sh => 23,
                // Pessimistic: size of the largest standard output script.
                AddressType::Unknown => 34,
            };
            OUTPUT_BASE + script
        }
        OutputShape::OpReturn(len) => OUTPUT_BASE + *len as u64,
    }
}

/// Rough vsize of a transaction with the given shape. Input types without a
/// table entry count as the largest supported input.
pub fn estimate_vsize(inputs: &[AddressType], outputs: &[OutputShape]) -> u64 {
    let largest = INPUT_BASE + P2WPKH_WITNESS;
    let input_total: u64 = inputs
        .iter()
        .map(|ty| input_vbytes(*ty).unwrap_or(largest))
        .sum();
    let output_total: u64 = outputs.iter().map(output_vbytes).sum();
    TX_FRAME + input_total + output_total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_documented_constants() {
        assert_eq!(input_vbytes(AddressType::P2wpkh), Some(68));
        assert_eq!(input_vbytes(AddressType::P2tr), Some(57));
        assert_eq!(input_vbytes(AddressType::P2pkh), Some(149));
        assert_eq!(input_vbytes(AddressType::P2shP2wpkh), Some(92));
        assert_eq!(input_vbytes(AddressType::Unknown), None);
    }

    #[test]
    fn op_return_scales_with_payload() {
        assert_eq!(
            output_vbytes(&OutputShape::OpReturn(30)),
            output_vbytes(&OutputShape::OpReturn(10)) + 20
        );
    }

    #[test]
    fn estimate_sums_the_shape() {
        let inputs = [AddressType::P2tr, AddressType::P2wpkh];
        let outputs = [
            OutputShape::Standard(AddressType::P2tr),
            OutputShape::OpReturn(20),
            OutputShape::Standard(AddressType::P2wpkh),
        ];
        assert_eq!(
            estimate_vsize(&inputs, &outputs),
            11 + 57 + 68 + (9 + 34) + (9 + 20) + (9 + 22)
        );
    }
}
