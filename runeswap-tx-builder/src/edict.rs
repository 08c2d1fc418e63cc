use std::collections::BTreeMap;

use bitcoin::{ScriptBuf, Transaction};
use ordinals::{Artifact, Edict, RuneId, Runestone};
use runeswap_types::{CoinBalance, CoinId, Utxo};

use crate::error::BuildError;

/// Converts a coin id into the rune id understood by the protocol encoder.
/// BTC (`0:0`) is not a rune and is rejected here.
pub fn rune_id(coin: CoinId) -> Result<RuneId, BuildError> {
    if coin.is_btc() {
        return Err(BuildError::InvalidRuneId(coin.to_string()));
    }
    RuneId::new(coin.block, coin.tx).ok_or_else(|| BuildError::InvalidRuneId(coin.to_string()))
}

/// What must flow back to the holder when a set of rune inputs is spent.
///
/// `change_amount` is the surplus of the moved rune; `carried` holds the full
/// balance of every other rune id riding along in the same outputs. Both are
/// re-allocated explicitly by edicts; nothing relies on the protocol's
/// unallocated-goes-to-first-output default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuneChangePlan {
    pub change_amount: u128,
    pub carried: Vec<CoinBalance>,
}

impl RuneChangePlan {
    /// A change output (and its edicts) is mandatory when the inputs carry
    /// more than one distinct rune id, or more of the moved rune than the
    /// transfer consumes.
    pub fn need_change(&self) -> bool {
        self.change_amount > 0 || !self.carried.is_empty()
    }
}

/// Computes the change plan for spending `amount` units of `coin` out of the
/// given inputs.
pub fn plan_rune_change(
    inputs: &[Utxo],
    coin: CoinId,
    amount: u128,
) -> Result<RuneChangePlan, BuildError> {
    let total: u128 = inputs.iter().map(|u| u.rune_value(coin)).sum();
    if total < amount {
        return Err(BuildError::InsufficientRuneUtxo);
    }

    let mut carried: BTreeMap<CoinId, u128> = BTreeMap::new();
    for balance in inputs.iter().flat_map(|u| u.coins.iter()) {
        if balance.id != coin {
            *carried.entry(balance.id).or_default() += balance.value;
        }
    }

    Ok(RuneChangePlan {
        change_amount: total - amount,
        carried: carried
            .into_iter()
            .map(|(id, value)| CoinBalance::new(id, value))
            .collect(),
    })
}

/// Edicts returning the plan's surplus and carried balances to the change
/// output at the given index. Zero amounts are skipped: a zero-amount edict
/// means "all remaining" to the protocol, which is never what change means.
pub fn change_edicts(
    plan: &RuneChangePlan,
    coin: CoinId,
    output: u32,
) -> Result<Vec<Edict>, BuildError> {
    let mut edicts = Vec::new();
    if plan.change_amount > 0 {
        edicts.push(Edict {
            id: rune_id(coin)?,
            amount: plan.change_amount,
            output,
        });
    }
    for balance in &plan.carried {
        edicts.push(Edict {
            id: rune_id(balance.id)?,
            amount: balance.value,
            output,
        });
    }
    Ok(edicts)
}

/// Encodes the edict list into a runestone op-return script. The encoder
/// orders edicts by rune id internally; the `output` index on each edict is
/// what binds it to a transaction output.
pub fn encode_runestone(edicts: Vec<Edict>) -> ScriptBuf {
    Runestone {
        edicts,
        ..Default::default()
    }
    .encipher()
}

/// Reads the rune balances a raw transaction assigns to `vout`, summed by
/// id. Used to reconstruct an existing pool output's balances.
pub fn rune_balances_in_output(tx: &Transaction, vout: u32) -> Vec<CoinBalance> {
    let Some(Artifact::Runestone(stone)) = Runestone::decipher(tx) else {
        return Vec::new();
    };
    let mut by_id: BTreeMap<CoinId, u128> = BTreeMap::new();
    for edict in &stone.edicts {
        if edict.output == vout {
            *by_id
                .entry(CoinId::rune(edict.id.block, edict.id.tx))
                .or_default() += edict.amount;
        }
    }
    by_id
        .into_iter()
        .map(|(id, value)| CoinBalance::new(id, value))
        .collect()
}
