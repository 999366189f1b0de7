//! `ClickHouse` access to the mempool and canonical beacon chain datasets.

/// Wire rows and their conversion into pipeline tables
pub mod models;
/// Read-only queries
pub mod reader;

pub use models::{CanonicalBlobSidecarRow, MempoolTransactionRow};
pub use reader::{ClickhouseReader, TimeRange};
