use std::str::FromStr;

use bitcoin::address::{Address, NetworkUnchecked};
use serde::{Deserialize, Serialize};

/// Script template behind an address.
///
/// The variant decides three things downstream: the signing descriptor the
/// wallet needs, the virtual-size contribution used when quoting a fee shape,
/// and whether taproot key tweaking applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    P2pkh,
    P2wpkh,
    P2tr,
    P2shP2wpkh,
    P2wsh,
    P2sh,
    Unknown,
}

impl AddressType {
    /// Classifies a Bitcoin address string.
    ///
    /// Bech32 version 0 with a 20-byte program is p2wpkh, version 0 with any
    /// other length p2wsh, version 1+ p2tr. Base58 pubkey-hash is p2pkh. A
    /// base58 script-hash is reported as wrapped p2wpkh: that is the only
    /// p2sh flavor the supported wallets produce, and the hash alone cannot
    /// distinguish further. Anything unparseable is `Unknown`, which
    /// downstream consumers reject explicitly instead of guessing.
    pub fn classify(address: &str) -> Self {
        let Ok(parsed) = Address::<NetworkUnchecked>::from_str(address) else {
            return Self::Unknown;
        };
        match parsed.assume_checked().address_type() {
            Some(bitcoin::AddressType::P2pkh) => Self::P2pkh,
            Some(bitcoin::AddressType::P2sh) => Self::P2shP2wpkh,
            Some(bitcoin::AddressType::P2wpkh) => Self::P2wpkh,
            Some(bitcoin::AddressType::P2wsh) => Self::P2wsh,
            Some(bitcoin::AddressType::P2tr) => Self::P2tr,
            _ => Self::Unknown,
        }
    }

    pub fn is_taproot(self) -> bool {
        matches!(self, Self::P2tr)
    }
}
