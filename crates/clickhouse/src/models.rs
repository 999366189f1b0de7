use clickhouse::Row;
use pipeline::{CanonicalBlobRecord, MempoolObservation};
use serde::{Deserialize, Serialize};

/// Mempool sighting of a blob transaction
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq)]
pub struct MempoolTransactionRow {
    /// Observation time (unix milliseconds)
    pub event_date_time_ms: i64,
    /// Transaction hash
    pub hash: String,
    /// Sender
    pub from: String,
    /// Recipient
    pub to: Option<String>,
    /// Nonce
    pub nonce: u64,
    /// Blob versioned hashes
    pub blob_hashes: Vec<String>,
    /// Sidecar size in bytes
    pub blob_sidecars_size: Option<f64>,
    /// Empty sidecar bytes
    pub blob_sidecars_empty_size: Option<f64>,
    /// Filled share of the sidecars
    pub fill_percentage: Option<f64>,
    /// Gas price
    pub gas_price: Option<f64>,
    /// Gas tip cap
    pub gas_tip_cap: Option<f64>,
    /// Gas fee cap
    pub gas_fee_cap: Option<f64>,
    /// Blob gas
    pub blob_gas: Option<f64>,
    /// Blob gas fee cap
    pub blob_gas_fee_cap: Option<f64>,
    /// Network
    pub meta_network_name: String,
}

impl From<MempoolTransactionRow> for MempoolObservation {
    fn from(row: MempoolTransactionRow) -> Self {
        Self {
            event_date_time_ms: row.event_date_time_ms,
            hash: row.hash,
            from: row.from,
            to: row.to,
            nonce: row.nonce,
            blob_hashes: row.blob_hashes,
            blob_sidecars_size: row.blob_sidecars_size,
            blob_sidecars_empty_size: row.blob_sidecars_empty_size,
            fill_percentage: row.fill_percentage,
            gas_price: row.gas_price,
            gas_tip_cap: row.gas_tip_cap,
            gas_fee_cap: row.gas_fee_cap,
            blob_gas: row.blob_gas,
            blob_gas_fee_cap: row.blob_gas_fee_cap,
            meta_network_name: row.meta_network_name,
        }
    }
}

/// Blob sidecar of a canonical beacon block
#[derive(Debug, Clone, Row, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalBlobSidecarRow {
    /// Slot
    pub slot: u64,
    /// Slot start (unix milliseconds)
    pub slot_start_ms: i64,
    /// Epoch
    pub epoch: u64,
    /// Index within the block
    pub blob_index: u64,
    /// Versioned hash
    pub versioned_hash: String,
    /// Blob size in bytes
    pub blob_size: u64,
    /// Network
    pub meta_network_name: String,
}

impl From<CanonicalBlobSidecarRow> for CanonicalBlobRecord {
    fn from(row: CanonicalBlobSidecarRow) -> Self {
        Self {
            slot: row.slot,
            slot_start_ms: row.slot_start_ms,
            epoch: row.epoch,
            blob_index: row.blob_index,
            versioned_hash: row.versioned_hash,
            blob_size: row.blob_size,
            meta_network_name: row.meta_network_name,
        }
    }
}
