//! Read-only queries against the mempool and beacon chain datasets.

use std::time::Instant;

use clickhouse::{Client, Row, query::Query};
use derive_more::Debug;
use eyre::{Context, Result};
use pipeline::{CanonicalBlobRecord, MempoolObservation};
use primitives::ProducerFilter;
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use crate::models::{CanonicalBlobSidecarRow, MempoolTransactionRow};

mod time_range;
pub use time_range::TimeRange;


/// EIP-4844 transaction type.
const BLOB_TX_TYPE: u8 = 3;

/// `ClickHouse` reader client (read-only operations)
#[derive(Clone, Debug)]
pub struct ClickhouseReader {
    /// Base client
    #[debug(skip)]
    base: Client,
    /// Database name
    db_name: String,
}

impl ClickhouseReader {
    /// Create a new `ClickHouse` reader client
    pub fn new(url: Url, db_name: String, username: String, password: String) -> Result<Self> {
        let client = Client::default()
            .with_url(url)
            .with_database(db_name.clone())
            .with_user(username)
            .with_password(password);

        Ok(Self { base: client, db_name })
    }

    async fn execute<R>(&self, query: Query, sql: &str) -> Result<Vec<R>>
    where
        R: Row + for<'b> Deserialize<'b>,
    {
        let start = Instant::now();

        let result = query.fetch_all::<R>().await;

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(rows) => {
                debug!(query = %sql, duration_ms, rows = rows.len(), "ClickHouse query executed")
            }
            Err(e) => error!(query = %sql, duration_ms, error = %e, "ClickHouse query failed"),
        }
        result.map_err(Into::into)
    }

    /// Blob transactions seen in the mempool of `network` within `range`,
    /// sent by any address of `producers`. An empty filter matches every
    /// sender.
    pub async fn get_mempool_transactions(
        &self,
        network: &str,
        producers: &ProducerFilter,
        range: TimeRange,
    ) -> Result<Vec<MempoolObservation>> {
        let sql = mempool_query(&self.db_name, range, !producers.is_empty());
        let mut query = self.base.query(&sql).bind(network);
        if !producers.is_empty() {
            query = query.bind(producers.addresses());
        }
        let rows = self
            .execute::<MempoolTransactionRow>(query, &sql)
            .await
            .context("fetching mempool transactions failed")?;

        info!(rows = rows.len(), range = %range.interval(), "fetched mempool transactions");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Blob sidecars of canonical beacon blocks of `network` within `range`.
    pub async fn get_canonical_blob_sidecars(
        &self,
        network: &str,
        range: TimeRange,
    ) -> Result<Vec<CanonicalBlobRecord>> {
        let sql = canonical_blob_sidecar_query(&self.db_name, range);
        let query = self.base.query(&sql).bind(network);
        let rows = self
            .execute::<CanonicalBlobSidecarRow>(query, &sql)
            .await
            .context("fetching canonical blob sidecars failed")?;

        info!(rows = rows.len(), range = %range.interval(), "fetched canonical blob sidecars");
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Mempool query. Binds the network name, then the sender list when
/// `filter_senders` is set.
fn mempool_query(db: &str, range: TimeRange, filter_senders: bool) -> String {
    let sender_filter =
        if filter_senders { " AND has(?, lower(toString(`from`)))" } else { "" };
    format!(
        "SELECT toUnixTimestamp64Milli(event_date_time) AS event_date_time_ms, \
                toString(hash) AS hash, \
                toString(`from`) AS `from`, \
                toNullable(toString(`to`)) AS `to`, \
                toUInt64(nonce) AS nonce, \
                arrayMap(h -> toString(h), blob_hashes) AS blob_hashes, \
                toNullable(toFloat64(blob_sidecars_size)) AS blob_sidecars_size, \
                toNullable(toFloat64(blob_sidecars_empty_size)) AS blob_sidecars_empty_size, \
                toNullable(if(blob_sidecars_size > 0, \
                    ROUND(100 - (blob_sidecars_empty_size / blob_sidecars_size) * 100, 2), \
                    NULL)) AS fill_percentage, \
                toNullable(toFloat64(gas_price)) AS gas_price, \
                toNullable(toFloat64(gas_tip_cap)) AS gas_tip_cap, \
                toNullable(toFloat64(gas_fee_cap)) AS gas_fee_cap, \
                toNullable(toFloat64(blob_gas)) AS blob_gas, \
                toNullable(toFloat64(blob_gas_fee_cap)) AS blob_gas_fee_cap, \
                toString(meta_network_name) AS meta_network_name \
         FROM {db}.mempool_transaction \
         WHERE event_date_time > now64() - INTERVAL {interval} \
           AND type = {BLOB_TX_TYPE} \
           AND meta_network_name = ?{sender_filter} \
         ORDER BY event_date_time ASC",
        interval = range.interval(),
    )
}

/// Canonical blob sidecar query. Binds the network name.
fn canonical_blob_sidecar_query(db: &str, range: TimeRange) -> String {
    format!(
        "SELECT toUInt64(slot) AS slot, \
                toInt64(toUnixTimestamp(slot_start_date_time)) * 1000 AS slot_start_ms, \
                toUInt64(epoch) AS epoch, \
                toUInt64(blob_index) AS blob_index, \
                toString(versioned_hash) AS versioned_hash, \
                toUInt64(blob_size) AS blob_size, \
                toString(meta_network_name) AS meta_network_name \
         FROM {db}.canonical_beacon_blob_sidecar \
         WHERE slot_start_date_time > now() - INTERVAL {interval} \
           AND meta_network_name = ? \
         ORDER BY slot ASC, blob_index ASC",
        interval = range.interval(),
    )
}
