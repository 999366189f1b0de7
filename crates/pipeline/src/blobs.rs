//! Expand mempool groups into per-blob rows and match them against the
//! canonical beacon chain.

use std::collections::HashMap;

use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{dedup::unique_rows, mempool::NormalizedMempoolGroup, models::CanonicalBlobRecord};

/// A single blob of a normalized mempool group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplodedBlob {
    /// Blob versioned hash
    pub versioned_hash: String,
    /// Transaction hash
    pub hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: Option<String>,
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
}

/// Canonical-side fields of a matched blob. `blob_index` is not carried:
/// inclusion is evaluated per versioned hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMatch {
    /// Beacon slot
    pub slot: u64,
    /// Slot start time (unix milliseconds)
    pub slot_start_ms: i64,
    /// Epoch
    pub epoch: u64,
    /// Blob size in bytes
    pub blob_size: u64,
    /// Network label
    pub meta_network_name: String,
}

/// An exploded blob left-joined with its canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedBlobRow {
    /// Mempool side
    pub blob: ExplodedBlob,
    /// Canonical side, `None` if the blob was never included
    pub canonical: Option<CanonicalMatch>,
}

/// Expand every group into one row per blob hash.
pub fn explode_groups(groups: &[NormalizedMempoolGroup]) -> Vec<ExplodedBlob> {
    groups
        .iter()
        .flat_map(|g| {
            g.blob_hashes.iter().zip(&g.submission_counts).map(move |(versioned_hash, count)| {
                ExplodedBlob {
                    versioned_hash: versioned_hash.clone(),
                    hash: g.hash.clone(),
                    from: g.from.clone(),
                    to: g.to.clone(),
                    nonce: g.nonce,
                    submission_count: *count,
                    earliest_seen_ms: g.earliest_seen_ms,
                    latest_seen_ms: g.latest_seen_ms,
                    blob_hashes_length: g.blob_hashes_length,
                    blob_sidecars_size: g.blob_sidecars_size,
                    fill_percentage: g.fill_percentage,
                    gas_price: g.gas_price,
                    gas_tip_cap: g.gas_tip_cap,
                    gas_fee_cap: g.gas_fee_cap,
                    blob_gas: g.blob_gas,
                    blob_gas_fee_cap: g.blob_gas_fee_cap,
                }
            })
        })
        .collect()
}

/// Left-join exploded blobs with canonical records on versioned hash, then
/// drop exact-duplicate rows.
pub fn join_canonical(
    blobs: Vec<ExplodedBlob>,
    canonical: &[CanonicalBlobRecord],
) -> Result<Vec<JoinedBlobRow>> {
    let projected = unique_rows(
        canonical
            .iter()
            .map(|r| {
                let m = CanonicalMatch {
                    slot: r.slot,
                    slot_start_ms: r.slot_start_ms,
                    epoch: r.epoch,
                    blob_size: r.blob_size,
                    meta_network_name: r.meta_network_name.clone(),
                };
                (r.versioned_hash.as_str(), m)
            })
            .collect(),
    )?;

    let mut by_hash: HashMap<&str, Vec<CanonicalMatch>> = HashMap::new();
    for (hash, m) in projected {
        by_hash.entry(hash).or_default().push(m);
    }

    let mut joined = Vec::with_capacity(blobs.len());
    let mut unmatched = 0usize;
    for blob in blobs {
        match by_hash.get(blob.versioned_hash.as_str()) {
            Some(matches) => joined.extend(
                matches
                    .iter()
                    .map(|m| JoinedBlobRow { blob: blob.clone(), canonical: Some(m.clone()) }),
            ),
            None => {
                unmatched += 1;
                joined.push(JoinedBlobRow { blob, canonical: None });
            }
        }
    }

    let joined = unique_rows(joined)?;
    debug!(rows = joined.len(), unmatched, "joined blobs with canonical sidecars");
    Ok(joined)
}

/// [`explode_groups`] followed by [`join_canonical`].
pub fn explode_and_join(
    groups: &[NormalizedMempoolGroup],
    canonical: &[CanonicalBlobRecord],
) -> Result<Vec<JoinedBlobRow>> {
    join_canonical(explode_groups(groups), canonical)
}
