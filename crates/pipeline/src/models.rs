//! Input table rows supplied by the data-acquisition collaborators.

use serde::{Deserialize, Serialize};

/// One sighting of a pending blob transaction in the public mempool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolObservation {
    /// Observation time (unix milliseconds)
    pub event_date_time_ms: i64,
    /// Transaction hash
    pub hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: Option<String>,
    /// Sender nonce
    pub nonce: u64,
    /// Blob versioned hashes carried by the transaction, in order
    pub blob_hashes: Vec<String>,
    /// Total blob sidecar size in bytes
    pub blob_sidecars_size: Option<f64>,
    /// Unused blob sidecar bytes
    pub blob_sidecars_empty_size: Option<f64>,
    /// Percentage of sidecar bytes carrying data
    pub fill_percentage: Option<f64>,
    /// Gas price (wei)
    pub gas_price: Option<f64>,
    /// Priority fee cap (wei)
    pub gas_tip_cap: Option<f64>,
    /// Fee cap (wei)
    pub gas_fee_cap: Option<f64>,
    /// Blob gas
    pub blob_gas: Option<f64>,
    /// Blob gas fee cap (wei)
    pub blob_gas_fee_cap: Option<f64>,
    /// Network label
    pub meta_network_name: String,
}

/// A blob included in a canonical beacon block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBlobRecord {
    /// Beacon slot
    pub slot: u64,
    /// Slot start time (unix milliseconds)
    pub slot_start_ms: i64,
    /// Epoch
    pub epoch: u64,
    /// Position of the blob within the block
    pub blob_index: u64,
    /// Blob versioned hash
    pub versioned_hash: String,
    /// Blob size in bytes
    pub blob_size: u64,
    /// Network label
    pub meta_network_name: String,
}

/// A finalized execution-layer transaction with its fee fields in wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTxRecord {
    /// Transaction hash
    pub hash: String,
    /// Block number
    pub block_number: u64,
    /// Sender address
    pub from: Option<String>,
    /// Recipient address
    pub to: Option<String>,
    /// Index within the block
    pub transaction_index: Option<u64>,
    /// Gas limit
    pub gas: Option<u128>,
    /// Gas price (wei)
    pub gas_price: Option<u128>,
    /// Effective gas price paid (wei)
    pub effective_gas_price: Option<u128>,
    /// Gas used
    pub gas_used: Option<u128>,
    /// Cumulative gas used in the block
    pub cumulative_gas_used: Option<u128>,
    /// Max fee per gas (wei)
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (wei)
    pub max_priority_fee_per_gas: Option<u128>,
}
