//! Execution-layer transaction retrieval from a Hypersync endpoint.

mod client;
mod retry;
/// Wire types of the JSON API
pub mod types;

pub use client::HypersyncClient;
