//! Collapse raw mempool sightings into one row per submitted transaction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::MempoolObservation;

/// One distinct (blob list, nonce, transaction) submission seen in the mempool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMempoolGroup {
    /// Blob versioned hashes, in transaction order
    pub blob_hashes: Vec<String>,
    /// Sender nonce
    pub nonce: u64,
    /// Last-seen transaction hash
    pub hash: String,
    /// Last-seen sender
    pub from: String,
    /// Last-seen recipient
    pub to: Option<String>,
    /// Earliest sighting (unix milliseconds)
    pub earliest_seen_ms: i64,
    /// Latest sighting (unix milliseconds)
    pub latest_seen_ms: i64,
    /// Mean number of blobs per sighting
    pub blob_hashes_length: f64,
    /// Mean sidecar size in bytes
    pub blob_sidecars_size: Option<f64>,
    /// Mean fill percentage
    pub fill_percentage: Option<f64>,
    /// Mean gas price (wei)
    pub gas_price: Option<f64>,
    /// Mean priority fee cap (wei)
    pub gas_tip_cap: Option<f64>,
    /// Mean fee cap (wei)
    pub gas_fee_cap: Option<f64>,
    /// Mean blob gas
    pub blob_gas: Option<f64>,
    /// Mean blob gas fee cap (wei)
    pub blob_gas_fee_cap: Option<f64>,
    /// Per blob hash, the number of groups carrying that hash.
    /// Index-aligned with `blob_hashes`.
    pub submission_counts: Vec<u32>,
}

impl NormalizedMempoolGroup {
    /// Highest resubmission count among the group's blobs.
    pub fn submission_count(&self) -> u32 {
        self.submission_counts.iter().copied().max().unwrap_or(1)
    }
}

/// Running mean that ignores missing values.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug)]
struct GroupAccumulator<'a> {
    first: &'a MempoolObservation,
    last: &'a MempoolObservation,
    earliest_seen_ms: i64,
    latest_seen_ms: i64,
    blob_hashes_length: Mean,
    blob_sidecars_size: Mean,
    fill_percentage: Mean,
    gas_price: Mean,
    gas_tip_cap: Mean,
    gas_fee_cap: Mean,
    blob_gas: Mean,
    blob_gas_fee_cap: Mean,
}

impl<'a> GroupAccumulator<'a> {
    fn new(obs: &'a MempoolObservation) -> Self {
        let mut acc = Self {
            first: obs,
            last: obs,
            earliest_seen_ms: obs.event_date_time_ms,
            latest_seen_ms: obs.event_date_time_ms,
            blob_hashes_length: Mean::default(),
            blob_sidecars_size: Mean::default(),
            fill_percentage: Mean::default(),
            gas_price: Mean::default(),
            gas_tip_cap: Mean::default(),
            gas_fee_cap: Mean::default(),
            blob_gas: Mean::default(),
            blob_gas_fee_cap: Mean::default(),
        };
        acc.add_means(obs);
        acc
    }

    fn push(&mut self, obs: &'a MempoolObservation) {
        self.earliest_seen_ms = self.earliest_seen_ms.min(obs.event_date_time_ms);
        if obs.event_date_time_ms >= self.latest_seen_ms {
            self.latest_seen_ms = obs.event_date_time_ms;
            self.last = obs;
        }
        self.add_means(obs);
    }

    fn add_means(&mut self, obs: &MempoolObservation) {
        self.blob_hashes_length.push(Some(obs.blob_hashes.len() as f64));
        self.blob_sidecars_size.push(obs.blob_sidecars_size);
        self.fill_percentage.push(obs.fill_percentage);
        self.gas_price.push(obs.gas_price);
        self.gas_tip_cap.push(obs.gas_tip_cap);
        self.gas_fee_cap.push(obs.gas_fee_cap);
        self.blob_gas.push(obs.blob_gas);
        self.blob_gas_fee_cap.push(obs.blob_gas_fee_cap);
    }

    fn finish(self) -> NormalizedMempoolGroup {
        NormalizedMempoolGroup {
            blob_hashes: self.first.blob_hashes.clone(),
            nonce: self.first.nonce,
            hash: self.last.hash.clone(),
            from: self.last.from.clone(),
            to: self.last.to.clone(),
            earliest_seen_ms: self.earliest_seen_ms,
            latest_seen_ms: self.latest_seen_ms,
            blob_hashes_length: self.blob_hashes_length.value().unwrap_or_default(),
            blob_sidecars_size: self.blob_sidecars_size.value(),
            fill_percentage: self.fill_percentage.value(),
            gas_price: self.gas_price.value(),
            gas_tip_cap: self.gas_tip_cap.value(),
            gas_fee_cap: self.gas_fee_cap.value(),
            blob_gas: self.blob_gas.value(),
            blob_gas_fee_cap: self.blob_gas_fee_cap.value(),
            submission_counts: Vec::new(),
        }
    }
}

/// Group mempool sightings by (blob hash list, nonce, transaction hash).
///
/// Re-broadcasts of one transaction collapse into a single group. A
/// replacement transaction re-using the same blobs forms its own group, and
/// every blob it shares with another group raises that blob's
/// `submission_counts` entry. Output is sorted ascending by
/// [`NormalizedMempoolGroup::submission_count`], ties in first-seen order.
pub fn normalize_mempool(observations: &[MempoolObservation]) -> Vec<NormalizedMempoolGroup> {
    let mut index: HashMap<(&[String], u64, &str), usize> = HashMap::new();
    let mut accumulators: Vec<GroupAccumulator<'_>> = Vec::new();

    for obs in observations {
        let key = (obs.blob_hashes.as_slice(), obs.nonce, obs.hash.as_str());
        match index.get(&key) {
            Some(&i) => accumulators[i].push(obs),
            None => {
                index.insert(key, accumulators.len());
                accumulators.push(GroupAccumulator::new(obs));
            }
        }
    }

    let mut groups: Vec<_> = accumulators.into_iter().map(GroupAccumulator::finish).collect();

    // Second pass keyed on the individual blob hash.
    let mut per_blob: HashMap<String, u32> = HashMap::new();
    for group in &groups {
        let distinct: HashSet<&String> = group.blob_hashes.iter().collect();
        for blob in distinct {
            *per_blob.entry(blob.clone()).or_default() += 1;
        }
    }
    for group in &mut groups {
        group.submission_counts =
            group.blob_hashes.iter().map(|b| per_blob.get(b).copied().unwrap_or(1)).collect();
    }

    groups.sort_by_key(NormalizedMempoolGroup::submission_count);

    debug!(observations = observations.len(), groups = groups.len(), "normalized mempool");
    groups
}
