use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::psbt::Psbt;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, CompressedPublicKey, PublicKey, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    Witness,
};
use runeswap_types::{AddressType, Utxo};
use serde::Serialize;

use crate::address::utxo_script;
use crate::error::BuildError;
use crate::fee::OutputShape;

/// Whose wallet an input is drawn from. Pool inputs are signed by the
/// exchange after orchestration; user inputs produce to-sign descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOwner {
    User,
    Pool,
}

/// Signing descriptor for one user-owned input, handed to the wallet
/// extension. Taproot inputs are addressed (the signer applies the key
/// tweak); every other type names the public key and disables tweaking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToSignInput {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    pub disable_tweak_signer: bool,
}

/// The finished unsigned transaction and everything the caller needs to get
/// it signed and submitted.
#[derive(Clone, Debug)]
pub struct AssembledTx {
    /// The unsigned transaction (empty script-sigs, empty witnesses).
    pub tx: Transaction,
    pub psbt: Psbt,
    /// Pre-signing transaction id, consistent with the id the network will
    /// report after signatures are attached.
    pub txid: Txid,
    /// Fee the transaction pays, exactly `inputs - outputs`.
    pub fee: u64,
    /// User-owned utxos consumed by this transaction; the caller marks them
    /// spent only after successful signing.
    pub to_spend_utxos: Vec<Utxo>,
    pub to_sign_inputs: Vec<ToSignInput>,
}

impl AssembledTx {
    pub fn psbt_hex(&self) -> String {
        hex::encode(self.psbt.serialize())
    }
}

struct OutputEntry {
    txout: TxOut,
    shape: OutputShape,
}

/// Append-only accumulator for the unsigned transaction.
///
/// Output indices are handed out at append time and never change afterwards:
/// the runestone's edicts and the pre-signing txid both depend on that
/// order. There is no remove or reorder operation on purpose.
pub struct TxAssembler {
    inputs: Vec<(Utxo, InputOwner)>,
    outputs: Vec<OutputEntry>,
    sequence: Sequence,
}

impl TxAssembler {
    pub fn new(enable_rbf: bool) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            sequence: if enable_rbf {
                Sequence::ENABLE_RBF_NO_LOCKTIME
            } else {
                Sequence::MAX
            },
        }
    }

    /// Appends an input and returns its index.
    pub fn push_input(&mut self, utxo: Utxo, owner: InputOwner) -> u32 {
        self.inputs.push((utxo, owner));
        (self.inputs.len() - 1) as u32
    }

    /// Appends an output paying `sats` to `script` and returns its index.
    pub fn push_output(&mut self, script: ScriptBuf, sats: u64) -> u32 {
        let shape = shape_of_script(&script);
        self.outputs.push(OutputEntry {
            txout: TxOut {
                value: Amount::from_sat(sats),
                script_pubkey: script,
            },
            shape,
        });
        (self.outputs.len() - 1) as u32
    }

    /// Appends a zero-value op-return output and returns its index.
    pub fn push_op_return(&mut self, script: ScriptBuf) -> u32 {
        self.push_output(script, 0)
    }

    /// Address types of the inputs committed so far, in transaction order.
    pub fn input_types(&self) -> Vec<AddressType> {
        self.inputs.iter().map(|(u, _)| u.address_type).collect()
    }

    /// Shapes of the outputs committed so far, in transaction order.
    pub fn output_shapes(&self) -> Vec<OutputShape> {
        self.outputs.iter().map(|e| e.shape).collect()
    }

    pub fn total_input_sats(&self) -> u64 {
        self.inputs.iter().map(|(u, _)| u.sats).sum()
    }

    pub fn total_output_sats(&self) -> u64 {
        self.outputs.iter().map(|e| e.txout.value.to_sat()).sum()
    }

    /// Committed output value minus committed input value: what the fee
    /// payer must still bring before fees, negative when the committed
    /// inputs already over-cover.
    pub fn economic_sats(&self) -> i128 {
        self.total_output_sats() as i128 - self.total_input_sats() as i128
    }

    /// Closes the builder: verifies conservation against `fee`, derives the
    /// pre-signing txid, produces the PSBT and the signing descriptors.
    pub fn finalize(self, fee: u64) -> Result<AssembledTx, BuildError> {
        let in_sats = self.total_input_sats();
        let out_sats = self.total_output_sats();
        if in_sats != out_sats.checked_add(fee).ok_or(BuildError::Math)? {
            return Err(BuildError::InsufficientInputAmount);
        }

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: self
                .inputs
                .iter()
                .map(|(utxo, _)| TxIn {
                    previous_output: utxo.outpoint(),
                    script_sig: ScriptBuf::new(),
                    sequence: self.sequence,
                    witness: Witness::new(),
                })
                .collect(),
            output: self.outputs.iter().map(|e| e.txout.clone()).collect(),
        };

        let txid = presign_txid(&tx, &self.inputs)?;

        let mut psbt = Psbt::from_unsigned_tx(tx.clone())?;
        for (index, (utxo, _)) in self.inputs.iter().enumerate() {
            psbt.inputs[index].witness_utxo = Some(TxOut {
                value: Amount::from_sat(utxo.sats),
                script_pubkey: utxo_script(utxo)?,
            });
            if utxo.address_type == AddressType::P2shP2wpkh {
                psbt.inputs[index].redeem_script = Some(p2wpkh_redeem_script(utxo)?);
            }
        }

        let to_sign_inputs = self
            .inputs
            .iter()
            .enumerate()
            .filter(|(_, (_, owner))| *owner == InputOwner::User)
            .map(|(index, (utxo, _))| to_sign_input(index as u32, utxo))
            .collect::<Result<Vec<_>, _>>()?;

        let to_spend_utxos = self
            .inputs
            .into_iter()
            .filter(|(_, owner)| *owner == InputOwner::User)
            .map(|(utxo, _)| utxo)
            .collect();

        Ok(AssembledTx {
            tx,
            psbt,
            txid,
            fee,
            to_spend_utxos,
            to_sign_inputs,
        })
    }
}

fn shape_of_script(script: &ScriptBuf) -> OutputShape {
    if script.is_op_return() {
        OutputShape::OpReturn(script.len() as u32)
    } else if script.is_p2wpkh() {
        OutputShape::Standard(AddressType::P2wpkh)
    } else if script.is_p2tr() {
        OutputShape::Standard(AddressType::P2tr)
    } else if script.is_p2pkh() {
        OutputShape::Standard(AddressType::P2pkh)
    } else if script.is_p2sh() {
        OutputShape::Standard(AddressType::P2shP2wpkh)
    } else if script.is_p2wsh() {
        OutputShape::Standard(AddressType::P2wsh)
    } else {
        OutputShape::Standard(AddressType::Unknown)
    }
}

/// The p2wpkh witness program a wrapped-segwit utxo's script hash commits
/// to, rebuilt from the utxo's public key.
fn p2wpkh_redeem_script(utxo: &Utxo) -> Result<ScriptBuf, BuildError> {
    let hex = utxo
        .public_key
        .as_deref()
        .ok_or_else(|| BuildError::MissingPublicKey(utxo.outpoint()))?;
    let key = PublicKey::from_str(hex)
        .map_err(|_| BuildError::MissingPublicKey(utxo.outpoint()))?;
    let key = CompressedPublicKey::try_from(key)
        .map_err(|_| BuildError::MissingPublicKey(utxo.outpoint()))?;
    Ok(ScriptBuf::new_p2wpkh(&key.wpubkey_hash()))
}

/// Pre-signing txid.
///
/// The network txid of a wrapped-segwit spend commits to the redeem-script
/// push in script-sig, so the clone used for id derivation carries it even
/// though the PSBT keeps script-sigs empty. Skipping this yields an id that
/// disagrees with the broadcast transaction and breaks the pool-utxo-receive
/// bookkeeping.
fn presign_txid(tx: &Transaction, inputs: &[(Utxo, InputOwner)]) -> Result<Txid, BuildError> {
    let mut clone = tx.clone();
    for (txin, (utxo, _)) in clone.input.iter_mut().zip(inputs) {
        if utxo.address_type == AddressType::P2shP2wpkh {
            let redeem = p2wpkh_redeem_script(utxo)?;
            let push = PushBytesBuf::try_from(redeem.to_bytes())
                .expect("a p2wpkh witness program fits a script push");
            txin.script_sig = Builder::new().push_slice(push).into_script();
        }
    }
    Ok(clone.compute_txid())
}

fn to_sign_input(index: u32, utxo: &Utxo) -> Result<ToSignInput, BuildError> {
    match utxo.address_type {
        AddressType::P2tr => Ok(ToSignInput {
            index,
            address: Some(utxo.address.clone()),
            public_key: None,
            disable_tweak_signer: false,
        }),
        AddressType::Unknown => Err(BuildError::UnknownAddressType(utxo.address.clone())),
        _ => {
            let public_key = utxo
                .public_key
                .clone()
                .ok_or_else(|| BuildError::MissingPublicKey(utxo.outpoint()))?;
            Ok(ToSignInput {
                index,
                address: None,
                public_key: Some(public_key),
                disable_tweak_signer: true,
            })
        }
    }
}
