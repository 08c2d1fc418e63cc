use std::str::FromStr;

use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::key::{Secp256k1, XOnlyPublicKey};
use bitcoin::{Network, ScriptBuf};
use runeswap_types::Utxo;

use crate::error::BuildError;

/// Parses an address and checks it against the expected network.
pub fn parse_address(s: &str, network: Network) -> Result<Address, BuildError> {
    s.parse::<Address<NetworkUnchecked>>()
        .map_err(|_| BuildError::InvalidAddress(s.to_string()))?
        .require_network(network)
        .map_err(|_| BuildError::InvalidAddress(s.to_string()))
}

/// Script locking the given utxo, derived from its owning address.
///
/// The indexer hands out addresses, not scripts; operations validate the
/// wallet and pool addresses against the network up front, so this parse is
/// unchecked with respect to network.
pub(crate) fn utxo_script(utxo: &Utxo) -> Result<ScriptBuf, BuildError> {
    let address = utxo
        .address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|_| BuildError::InvalidAddress(utxo.address.clone()))?;
    Ok(address.assume_checked().script_pubkey())
}

/// Derives the key-path p2tr address and its script for an x-only internal
/// key, as used for pool addresses. Deterministic and synchronous.
pub fn p2tr_address_and_script(
    internal_key_hex: &str,
    network: Network,
) -> Result<(Address, ScriptBuf), BuildError> {
    let key = XOnlyPublicKey::from_str(internal_key_hex)
        .map_err(|_| BuildError::InvalidAddress(internal_key_hex.to_string()))?;
    let secp = Secp256k1::verification_only();
    let address = Address::p2tr(&secp, key, None, network);
    let script = address.script_pubkey();
    Ok((address, script))
}
