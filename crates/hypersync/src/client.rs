use eyre::{Context, Result};
use pipeline::ExecutionTxRecord;
use primitives::{ProducerFilter, network::BLOCKS_PER_DAY};
use reqwest::Client as HttpClient;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    retry::retry_op,
    types::{HeightResponse, Query, QueryResponse},
};

/// Client for a Hypersync JSON endpoint.
#[derive(Debug, Clone)]
pub struct HypersyncClient {
    http: HttpClient,
    url: Url,
    bearer_token: Option<String>,
}

impl HypersyncClient {
    /// Create a new client for the endpoint at `url`.
    pub fn new(url: Url, bearer_token: Option<String>) -> Self {
        Self { http: HttpClient::new(), url, bearer_token }
    }

    fn auth(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.url.join(path).wrap_err_with(|| format!("invalid hypersync url for `{path}`"))
    }

    /// Latest block height known to the indexer.
    pub async fn get_height(&self) -> Result<u64> {
        let url = self.endpoint("height")?;
        let resp = retry_op(|| async {
            let resp = self.auth(self.http.get(url.clone())).send().await?.error_for_status()?;
            Ok(resp.json::<HeightResponse>().await?)
        })
        .await
        .context("fetching hypersync height failed")?;
        Ok(resp.height)
    }

    async fn send_query(&self, query: &Query) -> Result<QueryResponse> {
        let url = self.endpoint("query")?;
        retry_op(|| async {
            let resp =
                self.auth(self.http.post(url.clone())).json(query).send().await?.error_for_status()?;
            Ok(resp.json::<QueryResponse>().await?)
        })
        .await
        .wrap_err_with(|| format!("hypersync query from block {} failed", query.from_block))
    }

    /// Transactions sent by `senders` between `from_block` and `to_block`
    /// (exclusive), or up to the indexer's tip when `to_block` is `None`.
    pub async fn get_transactions(
        &self,
        senders: &ProducerFilter,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<ExecutionTxRecord>> {
        let mut query = Query::transactions_from(senders.addresses(), from_block, to_block);
        let mut records = Vec::new();

        loop {
            let res = self.send_query(&query).await?;
            for tx in res.data.into_iter().flat_map(|d| d.transactions) {
                records.push(ExecutionTxRecord::try_from(tx)?);
            }
            debug!(next_block = res.next_block, rows = records.len(), "scanned hypersync page");

            let Some(archive_height) = res.archive_height else {
                break;
            };
            if archive_height < res.next_block {
                break;
            }
            if to_block.is_some_and(|end| res.next_block >= end) {
                break;
            }
            if res.next_block <= query.from_block {
                warn!(next_block = res.next_block, "hypersync did not advance, stopping");
                break;
            }
            query.from_block = res.next_block;
        }

        info!(from_block, to_block, rows = records.len(), "fetched execution transactions");
        Ok(records)
    }

    /// Transactions sent by `senders` in roughly the last `period_days` days.
    pub async fn get_recent_transactions(
        &self,
        senders: &ProducerFilter,
        period_days: u64,
    ) -> Result<Vec<ExecutionTxRecord>> {
        let height = self.get_height().await?;
        let from_block = height.saturating_sub(period_days.saturating_mul(BLOCKS_PER_DAY));
        self.get_transactions(senders, from_block, None).await
    }
}
