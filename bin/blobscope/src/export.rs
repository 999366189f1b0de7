//! Writing and summarizing derived tables.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use eyre::{Context, Result};
use pipeline::{PipelineOutputs, TableSchema, encode_table};
use tracing::info;

/// Write each derived table as `<table>.json` into `dir`.
pub(crate) fn write_outputs(dir: &Path, outputs: &PipelineOutputs) -> Result<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;
    write_table(dir, &outputs.slot_inclusion)?;
    write_table(dir, outputs.slot_count_breakdown.as_slice())?;
    write_table(dir, &outputs.gas_bidding)?;
    write_table(dir, &outputs.bid_premium)?;
    info!(dir = %dir.display(), "wrote derived tables");
    Ok(())
}

fn write_table<T: TableSchema>(dir: &Path, rows: &[T]) -> Result<()> {
    let path = dir.join(format!("{}.json", T::NAME));
    let records = encode_table(rows)?;
    let mut writer = File::create(&path)
        .map(BufWriter::new)
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(&mut writer, &records)
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    writer.flush().wrap_err_with(|| format!("failed to flush {}", path.display()))
}

/// Log row counts, latency buckets and the premium paid per latency.
pub(crate) fn log_summary(outputs: &PipelineOutputs) {
    info!(
        slot_inclusion = outputs.slot_inclusion.len(),
        gas_bidding = outputs.gas_bidding.len(),
        bid_premium = outputs.bid_premium.len(),
        "derived tables"
    );
    match outputs.slot_count_breakdown {
        Some(b) => info!(
            one_slot = b.one_slot,
            two_slots = b.two_slots,
            three_plus_slots = b.three_plus_slots,
            "slot count breakdown"
        ),
        None => info!("no included blobs in the analysed window"),
    }
    for row in &outputs.bid_premium {
        info!(
            inclusion_slot_count = row.inclusion_slot_count,
            median_premium_percent = row.priority_fee_bid_percent_premium,
            mean_effective_gas_price_gwei = row.effective_gas_price_gwei,
            "bid premium"
        );
    }
}
