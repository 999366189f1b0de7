//! Core primitives for the Blobscope project.
/// Network constants for the beacon chain
pub mod network;
/// Blob producer selection
pub mod producer;
/// Async retry helpers
pub mod retries;
/// Fee unit conversion helpers
pub mod units;

pub use network::{SLOT_DURATION_SECS, TARGET_SLOT_COUNT};
pub use producer::{BlobProducer, ProducerFilter};
