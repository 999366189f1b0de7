//! Entrypoint.

use chrono::Utc;
use clap::Parser;
use clickhouse_lib::{ClickhouseReader, TimeRange};
use config::Opts;
use dotenvy::dotenv;
use eyre::Result;
use hypersync::HypersyncClient;
use pipeline::{Pipeline, PipelineInputs};
use primitives::ProducerFilter;
use snapshot::SnapshotStore;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

mod export;

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let producer = opts.pipeline.blob_producer()?;
    let filter = producer.filter();
    info!(
        network = %opts.pipeline.network,
        period_days = opts.pipeline.period_days,
        producers = filter.len(),
        "🔬 Blobscope starting..."
    );
    for addr in producer.addresses() {
        info!(%addr, name = producer.name_of(&addr).unwrap_or("unnamed"), "tracking blob producer");
    }

    let store = SnapshotStore::new(&opts.pipeline.cache_dir);
    let cached = if opts.pipeline.force_refresh {
        None
    } else {
        store.load_if_fresh(Utc::now().date_naive())?
    };
    let inputs = match cached {
        Some(inputs) => inputs,
        None => {
            let inputs = fetch_inputs(&opts, &filter).await?;
            store.save(&inputs)?;
            inputs
        }
    };

    let outputs = Pipeline::new(inputs).run()?;
    match &opts.pipeline.output_dir {
        Some(dir) => export::write_outputs(dir, &outputs)?,
        None => export::log_summary(&outputs),
    }
    Ok(())
}

async fn fetch_inputs(opts: &Opts, filter: &ProducerFilter) -> Result<PipelineInputs> {
    let reader = ClickhouseReader::new(
        opts.clickhouse.url.clone(),
        opts.clickhouse.db.clone(),
        opts.clickhouse.username.clone(),
        opts.clickhouse.password.clone(),
    )?;
    let hypersync =
        HypersyncClient::new(opts.hypersync.url.clone(), opts.hypersync.bearer_token.clone());

    let network = opts.pipeline.network.as_str();
    let range = TimeRange::from_days(opts.pipeline.period_days);
    let (mempool, canonical_blob_sidecars, execution_txs) = tokio::try_join!(
        reader.get_mempool_transactions(network, filter, range),
        reader.get_canonical_blob_sidecars(network, range),
        hypersync.get_recent_transactions(filter, opts.pipeline.period_days),
    )?;

    Ok(PipelineInputs { mempool, canonical_blob_sidecars, execution_txs })
}
