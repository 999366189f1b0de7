//! Blob inclusion latency and gas bidding analytics.
//!
//! Stages run in a fixed order, each a pure function from one table to the
//! next: [`normalize_mempool`], [`explode_and_join`],
//! [`calculate_inclusion_metrics`], then [`slot_count_breakdown`] and
//! [`calculate_gas_bidding`] over the inclusion records, and finally
//! [`summarize_bid_premium`]. [`Pipeline`] runs them over one set of inputs
//! and keeps every derived table it has computed.

/// Per-blob expansion and canonical join
pub mod blobs;
/// Latency bucket counts
pub mod breakdown;
/// Fee bidding metrics
pub mod bidding;
mod dedup;
/// Inclusion latency metrics
pub mod inclusion;
/// Mempool grouping
pub mod mempool;
/// Input table rows
pub mod models;
/// Bid premium per latency
pub mod premium;
/// Table schemas and validation
pub mod schema;

#[cfg(test)]
mod test_utils;

pub use bidding::{GasBiddingRecord, calculate_gas_bidding};
pub use blobs::{CanonicalMatch, ExplodedBlob, JoinedBlobRow, explode_and_join};
pub use breakdown::{SlotCountBreakdown, slot_count_breakdown};
pub use inclusion::{SlotInclusionRecord, calculate_inclusion_metrics};
pub use mempool::{NormalizedMempoolGroup, normalize_mempool};
pub use models::{CanonicalBlobRecord, ExecutionTxRecord, MempoolObservation};
pub use premium::{BidPremiumSummary, summarize_bid_premium};
pub use schema::{TableSchema, decode_table, encode_table};

use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The three tables consumed by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineInputs {
    /// Raw mempool sightings
    pub mempool: Vec<MempoolObservation>,
    /// Blobs included on the beacon chain
    pub canonical_blob_sidecars: Vec<CanonicalBlobRecord>,
    /// Execution-layer fee data
    pub execution_txs: Vec<ExecutionTxRecord>,
}

/// Every derived table of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutputs {
    /// Per-blob inclusion latency
    pub slot_inclusion: Vec<SlotInclusionRecord>,
    /// Latency bucket counts, absent when nothing was included
    pub slot_count_breakdown: Option<SlotCountBreakdown>,
    /// Per-transaction fee bidding
    pub gas_bidding: Vec<GasBiddingRecord>,
    /// Bid premium per inclusion slot count
    pub bid_premium: Vec<BidPremiumSummary>,
}

/// One pipeline invocation.
///
/// Each derived table is computed on first request and kept for the lifetime
/// of the value.
#[derive(Debug)]
pub struct Pipeline {
    inputs: PipelineInputs,
    slot_inclusion: Option<Vec<SlotInclusionRecord>>,
    slot_count_breakdown: Option<Option<SlotCountBreakdown>>,
    gas_bidding: Option<Vec<GasBiddingRecord>>,
    bid_premium: Option<Vec<BidPremiumSummary>>,
}

impl Pipeline {
    /// Create a pipeline over `inputs`.
    pub const fn new(inputs: PipelineInputs) -> Self {
        Self {
            inputs,
            slot_inclusion: None,
            slot_count_breakdown: None,
            gas_bidding: None,
            bid_premium: None,
        }
    }

    /// Input tables of this run.
    pub const fn inputs(&self) -> &PipelineInputs {
        &self.inputs
    }

    /// Per-blob inclusion latency records.
    pub fn slot_inclusion(&mut self) -> Result<&[SlotInclusionRecord]> {
        if self.slot_inclusion.is_none() {
            let groups = normalize_mempool(&self.inputs.mempool);
            let joined = explode_and_join(&groups, &self.inputs.canonical_blob_sidecars)?;
            self.slot_inclusion = Some(calculate_inclusion_metrics(joined));
        }
        Ok(self.slot_inclusion.as_deref().unwrap_or_default())
    }

    /// Latency bucket counts over [`Self::slot_inclusion`].
    pub fn slot_count_breakdown(&mut self) -> Result<Option<SlotCountBreakdown>> {
        if let Some(breakdown) = self.slot_count_breakdown {
            return Ok(breakdown);
        }
        let breakdown = slot_count_breakdown(self.slot_inclusion()?);
        self.slot_count_breakdown = Some(breakdown);
        Ok(breakdown)
    }

    /// Fee bidding records for included transactions.
    pub fn gas_bidding(&mut self) -> Result<&[GasBiddingRecord]> {
        if self.gas_bidding.is_none() {
            self.slot_inclusion()?;
            let records = self.slot_inclusion.as_deref().unwrap_or_default();
            let bids = calculate_gas_bidding(records, &self.inputs.execution_txs)?;
            self.gas_bidding = Some(bids);
        }
        Ok(self.gas_bidding.as_deref().unwrap_or_default())
    }

    /// Bid premium summary over [`Self::gas_bidding`].
    pub fn bid_premium(&mut self) -> Result<&[BidPremiumSummary]> {
        if self.bid_premium.is_none() {
            let summary = summarize_bid_premium(self.gas_bidding()?);
            self.bid_premium = Some(summary);
        }
        Ok(self.bid_premium.as_deref().unwrap_or_default())
    }

    /// Compute every derived table.
    pub fn run(&mut self) -> Result<PipelineOutputs> {
        let outputs = PipelineOutputs {
            slot_inclusion: self.slot_inclusion()?.to_vec(),
            slot_count_breakdown: self.slot_count_breakdown()?,
            gas_bidding: self.gas_bidding()?.to_vec(),
            bid_premium: self.bid_premium()?.to_vec(),
        };
        info!(
            mempool = self.inputs.mempool.len(),
            canonical = self.inputs.canonical_blob_sidecars.len(),
            execution_txs = self.inputs.execution_txs.len(),
            slot_inclusion = outputs.slot_inclusion.len(),
            gas_bidding = outputs.gas_bidding.len(),
            bid_premium = outputs.bid_premium.len(),
            "pipeline finished"
        );
        Ok(outputs)
    }
}
