//! Per-blob inclusion latency in seconds and slots.

use primitives::{SLOT_DURATION_SECS, TARGET_SLOT_COUNT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blobs::JoinedBlobRow;

/// Number of trailing rows averaged by `rolling_inclusion_slot_count_50`.
pub const ROLLING_WINDOW: usize = 50;

/// Inclusion latency of one blob that was seen in the mempool and finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInclusionRecord {
    /// Blob versioned hash
    pub versioned_hash: String,
    /// Transaction hash
    pub hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Sender nonce
    pub nonce: u64,
    /// Number of mempool groups carrying this blob
    pub submission_count: u32,
    /// Earliest mempool sighting (unix milliseconds)
    pub earliest_seen_ms: i64,
    /// Latest mempool sighting (unix milliseconds)
    pub latest_seen_ms: i64,
    /// Mean number of blobs per sighting
    pub blob_hashes_length: f64,
    /// Mean sidecar size in bytes
    pub blob_sidecars_size: f64,
    /// Mean fill percentage
    pub fill_percentage: f64,
    /// Mean gas price (wei)
    pub gas_price: f64,
    /// Mean priority fee cap (wei)
    pub gas_tip_cap: f64,
    /// Mean fee cap (wei)
    pub gas_fee_cap: f64,
    /// Mean blob gas
    pub blob_gas: f64,
    /// Mean blob gas fee cap (wei)
    pub blob_gas_fee_cap: f64,
    /// Beacon slot of inclusion
    pub slot: u64,
    /// Slot start time (unix milliseconds)
    pub slot_start_ms: i64,
    /// Epoch of inclusion
    pub epoch: u64,
    /// Slot start minus earliest sighting, in seconds. Negative under clock skew.
    pub inclusion_time_seconds: f64,
    /// Whole slots waited, at least one
    pub inclusion_slot_count: u64,
    /// Mean `inclusion_slot_count` of this and the 49 preceding rows
    pub rolling_inclusion_slot_count_50: f64,
    /// Designed inclusion target
    pub target_slot_count: u64,
}

/// A joined row with its derived metrics, before incomplete rows are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionMetricRow {
    /// Joined mempool and canonical data
    pub joined: JoinedBlobRow,
    /// Latency in seconds
    pub inclusion_time_seconds: Option<f64>,
    /// Latency in slots
    pub inclusion_slot_count: Option<u64>,
    /// Trailing mean over [`ROLLING_WINDOW`] rows
    pub rolling_inclusion_slot_count_50: Option<f64>,
    /// Designed inclusion target
    pub target_slot_count: u64,
}

impl InclusionMetricRow {
    fn slot_start_ms(&self) -> Option<i64> {
        self.joined.canonical.as_ref().map(|c| c.slot_start_ms)
    }

    /// Convert into a record, or `None` if any field is missing.
    pub fn into_record(self) -> Option<SlotInclusionRecord> {
        let Self {
            joined: JoinedBlobRow { blob, canonical },
            inclusion_time_seconds,
            inclusion_slot_count,
            rolling_inclusion_slot_count_50,
            target_slot_count,
        } = self;
        let canonical = canonical?;
        Some(SlotInclusionRecord {
            versioned_hash: blob.versioned_hash,
            hash: blob.hash,
            from: blob.from,
            to: blob.to?,
            nonce: blob.nonce,
            submission_count: blob.submission_count,
            earliest_seen_ms: blob.earliest_seen_ms,
            latest_seen_ms: blob.latest_seen_ms,
            blob_hashes_length: blob.blob_hashes_length,
            blob_sidecars_size: blob.blob_sidecars_size?,
            fill_percentage: blob.fill_percentage?,
            gas_price: blob.gas_price?,
            gas_tip_cap: blob.gas_tip_cap?,
            gas_fee_cap: blob.gas_fee_cap?,
            blob_gas: blob.blob_gas?,
            blob_gas_fee_cap: blob.blob_gas_fee_cap?,
            slot: canonical.slot,
            slot_start_ms: canonical.slot_start_ms,
            epoch: canonical.epoch,
            inclusion_time_seconds: inclusion_time_seconds?,
            inclusion_slot_count: inclusion_slot_count?,
            rolling_inclusion_slot_count_50: rolling_inclusion_slot_count_50?,
            target_slot_count,
        })
    }
}

/// Seconds between the earliest mempool sighting and the slot start.
pub fn inclusion_time_seconds(earliest_seen_ms: i64, slot_start_ms: i64) -> f64 {
    (slot_start_ms - earliest_seen_ms) as f64 / 1000.0
}

/// Whole slots covering `seconds`, ignoring its sign. Never below one: a blob
/// seen exactly at slot start still waited for that slot.
pub fn inclusion_slot_count(seconds: f64) -> u64 {
    ((seconds.abs() / SLOT_DURATION_SECS).ceil() as u64).max(1)
}

/// Mean of each full trailing window of `window` values.
///
/// Rows with fewer than `window` values up to and including themselves, or
/// with a missing value inside their window, get `None`.
pub fn trailing_mean(values: &[Option<u64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0u64;
    let mut missing = 0usize;
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => sum += v,
            None => missing += 1,
        }
        if i >= window {
            match values[i - window] {
                Some(v) => sum -= v,
                None => missing -= 1,
            }
        }
        let full = i + 1 >= window;
        out.push((full && missing == 0).then(|| sum as f64 / window as f64));
    }
    out
}

/// Derive latency columns, order rows by slot start time (unmatched rows
/// last, ties keep their order) and attach the rolling mean and target.
pub fn derive_inclusion_metrics(rows: Vec<JoinedBlobRow>) -> Vec<InclusionMetricRow> {
    let mut metrics: Vec<_> = rows
        .into_iter()
        .map(|joined| {
            let seconds = joined
                .canonical
                .as_ref()
                .map(|c| inclusion_time_seconds(joined.blob.earliest_seen_ms, c.slot_start_ms));
            InclusionMetricRow {
                inclusion_time_seconds: seconds,
                inclusion_slot_count: seconds.map(inclusion_slot_count),
                rolling_inclusion_slot_count_50: None,
                target_slot_count: TARGET_SLOT_COUNT,
                joined,
            }
        })
        .collect();

    metrics.sort_by_key(|r| {
        let start = r.slot_start_ms();
        (start.is_none(), start)
    });

    let counts: Vec<_> = metrics.iter().map(|r| r.inclusion_slot_count).collect();
    for (row, mean) in metrics.iter_mut().zip(trailing_mean(&counts, ROLLING_WINDOW)) {
        row.rolling_inclusion_slot_count_50 = mean;
    }
    metrics
}

/// Compute [`SlotInclusionRecord`]s from joined blob rows.
///
/// Rows with any missing field are dropped once every derived column has
/// been computed. That removes blobs never finalized, blobs with incomplete
/// mempool data and the first `ROLLING_WINDOW - 1` rows of the ordering.
pub fn calculate_inclusion_metrics(rows: Vec<JoinedBlobRow>) -> Vec<SlotInclusionRecord> {
    let input = rows.len();
    let records: Vec<_> = derive_inclusion_metrics(rows)
        .into_iter()
        .filter_map(InclusionMetricRow::into_record)
        .collect();
    debug!(input, records = records.len(), "calculated inclusion metrics");
    records
}
