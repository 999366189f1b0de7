//! On-disk snapshot of the pipeline input tables.
//!
//! A snapshot is three JSON files, one per input table. Tables are validated
//! against their schema when loaded and never altered, so a pipeline run over
//! a rehydrated snapshot matches a run over the freshly fetched tables.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Days, NaiveDate};
use eyre::{Context, Result};
use pipeline::{CanonicalBlobRecord, PipelineInputs, TableSchema, decode_table, encode_table};
use serde_json::Value;
use tracing::{debug, info, warn};

/// File holding the mempool observations
pub const MEMPOOL_FILE: &str = "mempool.json";
/// File holding the canonical blob sidecars
pub const CANONICAL_FILE: &str = "canonical_blob_sidecars.json";
/// File holding the execution transactions
pub const EXECUTION_TXS_FILE: &str = "execution_txs.json";

/// Directory-backed store for one snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether all three table files exist.
    pub fn exists(&self) -> bool {
        [MEMPOOL_FILE, CANONICAL_FILE, EXECUTION_TXS_FILE].iter().all(|f| self.dir.join(f).is_file())
    }

    /// Load every table of the snapshot.
    pub fn load(&self) -> Result<PipelineInputs> {
        let inputs = PipelineInputs {
            mempool: self.read_table(MEMPOOL_FILE)?,
            canonical_blob_sidecars: self.read_table(CANONICAL_FILE)?,
            execution_txs: self.read_table(EXECUTION_TXS_FILE)?,
        };
        info!(
            dir = %self.dir.display(),
            mempool = inputs.mempool.len(),
            canonical = inputs.canonical_blob_sidecars.len(),
            execution_txs = inputs.execution_txs.len(),
            "loaded snapshot"
        );
        Ok(inputs)
    }

    /// Load the snapshot if it exists and is fresh on `today`.
    pub fn load_if_fresh(&self, today: NaiveDate) -> Result<Option<PipelineInputs>> {
        if !self.exists() {
            debug!(dir = %self.dir.display(), "no snapshot");
            return Ok(None);
        }
        let inputs = self.load()?;
        if is_fresh(&inputs.canonical_blob_sidecars, today) {
            return Ok(Some(inputs));
        }
        warn!(
            dir = %self.dir.display(),
            latest = ?latest_slot_date(&inputs.canonical_blob_sidecars),
            %today,
            "snapshot is stale"
        );
        Ok(None)
    }

    /// Write every table, replacing any previous snapshot.
    pub fn save(&self, inputs: &PipelineInputs) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("failed to create {}", self.dir.display()))?;
        self.write_table(MEMPOOL_FILE, &inputs.mempool)?;
        self.write_table(CANONICAL_FILE, &inputs.canonical_blob_sidecars)?;
        self.write_table(EXECUTION_TXS_FILE, &inputs.execution_txs)?;
        info!(dir = %self.dir.display(), "saved snapshot");
        Ok(())
    }

    fn read_table<T: TableSchema>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        let reader = File::open(&path)
            .map(BufReader::new)
            .wrap_err_with(|| format!("failed to open {}", path.display()))?;
        let records: Vec<Value> = serde_json::from_reader(reader)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        decode_table(records).wrap_err_with(|| format!("invalid snapshot {}", path.display()))
    }

    fn write_table<T: TableSchema>(&self, file: &str, rows: &[T]) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        let records = encode_table(rows)?;

        let mut writer = File::create(&tmp)
            .map(BufWriter::new)
            .wrap_err_with(|| format!("failed to create {}", tmp.display()))?;
        serde_json::to_writer(&mut writer, &records)
            .wrap_err_with(|| format!("failed to write {}", tmp.display()))?;
        writer.flush().wrap_err_with(|| format!("failed to flush {}", tmp.display()))?;
        drop(writer);

        fs::rename(&tmp, &path).wrap_err_with(|| format!("failed to replace {}", path.display()))?;
        debug!(path = %path.display(), rows = rows.len(), "wrote table");
        Ok(())
    }
}

/// UTC date of the latest slot start among `canonical`.
pub fn latest_slot_date(canonical: &[CanonicalBlobRecord]) -> Option<NaiveDate> {
    let latest = canonical.iter().map(|r| r.slot_start_ms).max()?;
    DateTime::from_timestamp_millis(latest).map(|dt| dt.date_naive())
}

/// A snapshot stays fresh until the day after its latest slot.
pub fn is_fresh(canonical: &[CanonicalBlobRecord], today: NaiveDate) -> bool {
    latest_slot_date(canonical)
        .and_then(|latest| latest.checked_add_days(Days::new(1)))
        .is_some_and(|expiry| today <= expiry)
}
