use async_trait::async_trait;
use runeswap_types::{AddressType, Utxo};
use tracing::{debug, trace};

use crate::constants::{DUST_LIMIT, FEE_SAFETY_MARGIN};
use crate::error::BuildError;
use crate::select::select_btc_utxos;
use crate::vsize;

/// Shape of one transaction output as presented to the fee estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputShape {
    Standard(AddressType),
    /// An op-return output carrying a payload of the given byte length.
    OpReturn(u32),
}

/// Remote fee-estimation capability.
///
/// Given the input/output shape of a transaction and the pool addresses it
/// touches, returns the minimal total fee in satoshis that gets the
/// transaction relayed at the current mempool rate. Any failure is fatal to
/// the current builder invocation; callers retry the whole build.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
    async fn estimate_min_tx_fee(
        &self,
        input_types: &[AddressType],
        pool_addresses: &[String],
        output_shapes: &[OutputShape],
    ) -> anyhow::Result<u64>;
}

/// Fixed point of the fee/UTXO circularity.
#[derive(Clone, Debug)]
pub struct Converged {
    /// Total fee the transaction pays, dust-fold included.
    pub fee: u64,
    /// Payer BTC utxos pulled in to cover the economic amount plus fee.
    pub selected: Vec<Utxo>,
    /// Change returned to the payer, when above the dust limit.
    pub change: Option<u64>,
    /// Iterations the loop took; exposed for tests and observability.
    pub iterations: u32,
}

/// Everything the convergence loop needs to know about the transaction under
/// construction. The committed inputs and outputs are fixed; only the payer
/// BTC inputs and the trailing change output vary across iterations.
pub struct ConvergeRequest<'a> {
    pub estimator: &'a dyn FeeEstimator,
    /// Address types of inputs already committed (pool and rune inputs), in
    /// transaction order.
    pub committed_inputs: Vec<AddressType>,
    pub pool_addresses: Vec<String>,
    /// Shapes of outputs already committed, in transaction order.
    pub committed_outputs: Vec<OutputShape>,
    /// Satoshi value of committed outputs minus committed inputs; negative
    /// when the committed inputs already over-cover the outputs.
    pub economic_sats: i128,
    /// The payer's script type, appended as the trailing change-output slot.
    pub payer_type: AddressType,
    /// The payer's spendable BTC utxos, in wallet order.
    pub candidates: &'a [Utxo],
    /// Target rate in sats/vbyte, used only for a local cross-check against
    /// the remote quote.
    pub fee_rate: f64,
}

/// Resolves the fee/input circularity: the fee depends on the final shape,
/// and covering the fee may pull in another input, which changes the shape.
///
/// Each iteration re-quotes against the current shape and, while the quote
/// keeps growing, re-selects the payer set from scratch against the fresh
/// target. The loop ends as soon as a quote stops growing; every added input
/// raises the quote by a bounded amount and covers at least a dust-sized
/// value, so the iteration count stays small.
pub async fn converge(req: ConvergeRequest<'_>) -> Result<Converged, BuildError> {
    let mut prev_fee: Option<u64> = None;
    let mut selected: Vec<Utxo> = Vec::new();
    let mut iterations = 0u32;

    let fee = loop {
        iterations += 1;

        let mut input_types = req.committed_inputs.clone();
        input_types.extend(selected.iter().map(|u| u.address_type));
        let mut output_shapes = req.committed_outputs.clone();
        output_shapes.push(OutputShape::Standard(req.payer_type));

        let quoted = req
            .estimator
            .estimate_min_tx_fee(&input_types, &req.pool_addresses, &output_shapes)
            .await
            .map_err(BuildError::FeeEstimator)?;
        let fee = quoted + FEE_SAFETY_MARGIN;

        let local = vsize::estimate_vsize(&input_types, &output_shapes);
        trace!(
            iteration = iterations,
            quoted,
            local_vbytes = local,
            local_fee = (local as f64 * req.fee_rate).ceil() as u64,
            "fee quote"
        );

        match prev_fee {
            Some(prev) if fee <= prev => break fee,
            _ => {}
        }
        prev_fee = Some(fee);

        let target = req.economic_sats + fee as i128;
        if target > 0 {
            let selection = select_btc_utxos(req.candidates, target as u64);
            if (selection.total_sats as i128) < target {
                return Err(BuildError::InsufficientBtcUtxo);
            }
            selected = selection.selected;
        }
    };

    let total: i128 = selected.iter().map(|u| u.sats as i128).sum();
    let needed = req.economic_sats + fee as i128;
    let surplus = total - needed;
    debug_assert!(surplus >= 0, "selection never under-covers after convergence");
    let surplus = surplus as u64;

    // A sub-dust remainder is folded into the fee, never emitted as an
    // output.
    let (fee, change) = if surplus > DUST_LIMIT {
        (fee, Some(surplus))
    } else {
        (fee + surplus, None)
    };

    debug!(fee, ?change, iterations, inputs = selected.len(), "fee converged");

    Ok(Converged {
        fee,
        selected,
        change,
        iterations,
    })
}
