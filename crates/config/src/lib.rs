//! Blobscope configuration
use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use primitives::{BlobProducer, network::DEFAULT_NETWORK};
use url::Url;

/// Clickhouse database configuration options
#[derive(Debug, Clone, Parser)]
pub struct ClickhouseOpts {
    /// Clickhouse URL
    #[clap(id = "clickhouse_url", long = "clickhouse-url", env = "CLICKHOUSE_URL")]
    pub url: Url,
    /// Clickhouse database
    #[clap(long = "clickhouse-db", env = "CLICKHOUSE_DB", default_value = "default")]
    pub db: String,
    /// Clickhouse username
    #[clap(long = "clickhouse-username", env = "CLICKHOUSE_USERNAME")]
    pub username: String,
    /// Clickhouse password
    #[clap(long = "clickhouse-password", env = "CLICKHOUSE_PASSWORD")]
    pub password: String,
}

/// Hypersync endpoint configuration options
#[derive(Debug, Clone, Parser)]
pub struct HypersyncOpts {
    /// Hypersync URL
    #[clap(id = "hypersync_url", long = "hypersync-url", env = "HYPERSYNC_URL", default_value = "https://eth.hypersync.xyz")]
    pub url: Url,
    /// Hypersync bearer token
    #[clap(long = "hypersync-bearer-token", env = "HYPERSYNC_BEARER_TOKEN")]
    pub bearer_token: Option<String>,
}

/// Analysis window and blob producer selection
#[derive(Debug, Clone, Parser)]
pub struct PipelineOpts {
    /// Network label of the datasets
    #[clap(long, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,
    /// Number of days to analyse
    #[clap(long, env = "PERIOD_DAYS", default_value = "1")]
    pub period_days: u64,
    /// Blob producer addresses. Defaults to the well-known rollup sequencers.
    #[clap(long = "blob-producer", env = "BLOB_PRODUCERS", value_delimiter = ',')]
    pub blob_producers: Vec<Address>,
    /// Names of the blob producers, in the same order as the addresses
    #[clap(long = "blob-producer-name", env = "BLOB_PRODUCER_NAMES", value_delimiter = ',')]
    pub blob_producer_names: Vec<String>,
    /// Directory holding the cached input tables
    #[clap(long, env = "CACHE_DIR", default_value = "data")]
    pub cache_dir: PathBuf,
    /// Directory to write the derived tables to
    #[clap(long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
    /// Re-fetch inputs even if the cache is fresh
    #[clap(long)]
    pub force_refresh: bool,
}

impl PipelineOpts {
    /// Resolve the configured blob producer.
    pub fn blob_producer(&self) -> Result<BlobProducer> {
        BlobProducer::from_parts(self.blob_producers.clone(), self.blob_producer_names.clone())
    }
}

/// CLI options for blobscope
#[derive(Debug, Clone, Parser)]
pub struct Opts {
    /// Clickhouse database configuration
    #[clap(flatten)]
    pub clickhouse: ClickhouseOpts,

    /// Hypersync endpoint configuration
    #[clap(flatten)]
    pub hypersync: HypersyncOpts,

    /// Pipeline configuration
    #[clap(flatten)]
    pub pipeline: PipelineOpts,
}
