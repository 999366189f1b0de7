//! Fee bidding behaviour of included blob transactions.

use std::collections::HashMap;

use eyre::Result;
use primitives::units::{opt_wei_to_gwei, percent_of, round_to};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{dedup::unique_rows, inclusion::SlotInclusionRecord, models::ExecutionTxRecord};

/// Fee paid and bid by one included transaction, in gwei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasBiddingRecord {
    /// Transaction hash
    pub hash: String,
    /// Execution block number
    pub block_number: u64,
    /// Whole slots waited
    pub inclusion_slot_count: u64,
    /// Number of mempool groups carrying the blob
    pub submission_count: u32,
    /// Effective gas price paid
    pub effective_gas_price_gwei: f64,
    /// Max fee per gas bid
    pub max_fee_per_gas_gwei: f64,
    /// Max priority fee per gas bid
    pub max_priority_fee_per_gas_gwei: f64,
    /// Priority fee bid as a percentage of the effective gas price
    pub priority_fee_bid_percent_premium: f64,
    /// Effective gas price minus priority fee, an estimate of the base fee
    pub min_block_gas_gwei: f64,
    /// Absolute change of `min_block_gas_gwei` against the previous row
    pub gas_fluctuation_gwei: f64,
    /// `gas_fluctuation_gwei` as a percentage of `min_block_gas_gwei`
    pub gas_fluctuation_percent: f64,
}

/// An inclusion row joined with execution fees, before any null-drop.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct BidRow<'a> {
    hash: &'a str,
    inclusion_slot_count: u64,
    submission_count: u32,
    block_number: Option<u64>,
    effective_gas_price_gwei: Option<f64>,
    max_fee_per_gas_gwei: Option<f64>,
    max_priority_fee_per_gas_gwei: Option<f64>,
    priority_fee_bid_percent_premium: Option<f64>,
}

impl<'a> BidRow<'a> {
    fn new(record: &'a SlotInclusionRecord, tx: Option<&ExecutionTxRecord>) -> Self {
        let effective = tx.and_then(|t| opt_wei_to_gwei(t.effective_gas_price));
        let priority = tx.and_then(|t| opt_wei_to_gwei(t.max_priority_fee_per_gas));
        let premium = effective
            .zip(priority)
            .and_then(|(eff, prio)| percent_of(prio, eff))
            .map(|p| round_to(p, 3));
        Self {
            hash: &record.hash,
            inclusion_slot_count: record.inclusion_slot_count,
            submission_count: record.submission_count,
            block_number: tx.map(|t| t.block_number),
            effective_gas_price_gwei: effective,
            max_fee_per_gas_gwei: tx.and_then(|t| opt_wei_to_gwei(t.max_fee_per_gas)),
            max_priority_fee_per_gas_gwei: priority,
            priority_fee_bid_percent_premium: premium,
        }
    }

    fn complete(
        self,
        min_block_gas_gwei: Option<f64>,
        gas_fluctuation_gwei: Option<f64>,
        gas_fluctuation_percent: Option<f64>,
    ) -> Option<GasBiddingRecord> {
        Some(GasBiddingRecord {
            hash: self.hash.to_owned(),
            block_number: self.block_number?,
            inclusion_slot_count: self.inclusion_slot_count,
            submission_count: self.submission_count,
            effective_gas_price_gwei: self.effective_gas_price_gwei?,
            max_fee_per_gas_gwei: self.max_fee_per_gas_gwei?,
            max_priority_fee_per_gas_gwei: self.max_priority_fee_per_gas_gwei?,
            priority_fee_bid_percent_premium: self.priority_fee_bid_percent_premium?,
            min_block_gas_gwei: min_block_gas_gwei?,
            gas_fluctuation_gwei: gas_fluctuation_gwei?,
            gas_fluctuation_percent: gas_fluctuation_percent?,
        })
    }

    fn min_block_gas_gwei(&self) -> Option<f64> {
        let eff = self.effective_gas_price_gwei?;
        let prio = self.max_priority_fee_per_gas_gwei?;
        Some(eff - prio)
    }
}

/// Compute [`GasBiddingRecord`]s for inclusion records with known fees.
///
/// Inclusion records are left-joined with `txs` on transaction hash, duplicate
/// rows removed and the result ordered by block number before fluctuation is
/// measured against the preceding row. Rows missing any value, including the
/// first row which has no predecessor, are dropped.
pub fn calculate_gas_bidding(
    records: &[SlotInclusionRecord],
    txs: &[ExecutionTxRecord],
) -> Result<Vec<GasBiddingRecord>> {
    let txs = unique_rows(txs.iter().collect())?;
    let mut by_hash: HashMap<&str, Vec<&ExecutionTxRecord>> = HashMap::new();
    for tx in txs {
        by_hash.entry(tx.hash.as_str()).or_default().push(tx);
    }

    let mut joined = Vec::with_capacity(records.len());
    for record in records {
        match by_hash.get(record.hash.as_str()) {
            Some(matches) => joined.extend(matches.iter().map(|&tx| BidRow::new(record, Some(tx)))),
            None => joined.push(BidRow::new(record, None)),
        }
    }

    let mut rows = unique_rows(joined)?;
    rows.sort_by_key(|r| (r.block_number.is_none(), r.block_number));

    let mut bids = Vec::with_capacity(rows.len());
    let mut previous: Option<f64> = None;
    for row in rows {
        let min_block_gas = row.min_block_gas_gwei();
        let fluctuation = min_block_gas.zip(previous).map(|(cur, prev)| (cur - prev).abs());
        previous = min_block_gas;

        let fluctuation_percent =
            fluctuation.zip(min_block_gas).and_then(|(f, base)| percent_of(f, base));

        let complete = row.complete(min_block_gas, fluctuation, fluctuation_percent);
        bids.extend(complete);
    }

    debug!(records = records.len(), bids = bids.len(), "calculated gas bidding");
    Ok(bids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::execution_tx;

    const GWEI: u128 = 1_000_000_000;

    fn inclusion(hash: &str, blob: &str, slots: u64) -> SlotInclusionRecord {
        SlotInclusionRecord {
            versioned_hash: blob.to_owned(),
            hash: hash.to_owned(),
            from: "0xsender".to_owned(),
            to: "0xinbox".to_owned(),
            nonce: 0,
            submission_count: 1,
            earliest_seen_ms: 0,
            latest_seen_ms: 0,
            blob_hashes_length: 1.0,
            blob_sidecars_size: 131_072.0,
            fill_percentage: 100.0,
            gas_price: 1e9,
            gas_tip_cap: 1e9,
            gas_fee_cap: 2e9,
            blob_gas: 131_072.0,
            blob_gas_fee_cap: 1e9,
            slot: 1,
            slot_start_ms: 12_000,
            epoch: 0,
            inclusion_time_seconds: 12.0,
            inclusion_slot_count: slots,
            rolling_inclusion_slot_count_50: 1.0,
            target_slot_count: 2,
        }
    }

    #[test]
    fn fluctuation_is_measured_against_previous_block() {
        let records = vec![inclusion("0xb", "0x02", 2), inclusion("0xa", "0x01", 1)];
        let txs = vec![
            execution_tx("0xb", 11, 21 * GWEI, 1_500_000_000),
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
        ];
        let bids = calculate_gas_bidding(&records, &txs).unwrap();

        assert_eq!(bids.len(), 1);
        let bid = &bids[0];
        assert_eq!(bid.hash, "0xb");
        assert_eq!(bid.block_number, 11);
        assert_eq!(bid.inclusion_slot_count, 2);
        assert_eq!(bid.effective_gas_price_gwei, 21.0);
        assert_eq!(bid.max_fee_per_gas_gwei, 42.0);
        assert_eq!(bid.max_priority_fee_per_gas_gwei, 1.5);
        assert_eq!(bid.priority_fee_bid_percent_premium, 7.143);
        assert_eq!(bid.min_block_gas_gwei, 19.5);
        assert_eq!(bid.gas_fluctuation_gwei, 1.5);
        assert_eq!(bid.gas_fluctuation_percent, 1.5 / 19.5 * 100.0);
    }

    #[test]
    fn derived_gas_columns_are_not_rounded() {
        let records = vec![inclusion("0xa", "0x01", 1), inclusion("0xb", "0x02", 1)];
        let txs = vec![
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 21_000_400_000, 1_000_000_000),
        ];
        let bids = calculate_gas_bidding(&records, &txs).unwrap();

        assert_eq!(bids.len(), 1);
        let bid = &bids[0];
        assert_eq!(bid.effective_gas_price_gwei, 21.0);
        assert_eq!(bid.min_block_gas_gwei, 20.0);
        assert_eq!(bid.gas_fluctuation_gwei, 2.0);
        assert_eq!(bid.gas_fluctuation_percent, 10.0);

        let txs = vec![
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 20_001 * GWEI / 1_000, 2 * GWEI),
        ];
        let bid = &calculate_gas_bidding(&records, &txs).unwrap()[0];
        let fluctuation: f64 = (20.001 - 2.0) - 18.0;
        assert_eq!(bid.gas_fluctuation_gwei, fluctuation.abs());
        assert_eq!(bid.gas_fluctuation_percent, fluctuation.abs() / (20.001 - 2.0) * 100.0);
        assert_ne!(bid.gas_fluctuation_percent, 0.006);
    }

    #[test]
    fn records_without_fees_are_dropped() {
        let records = vec![
            inclusion("0xa", "0x01", 1),
            inclusion("0xb", "0x02", 1),
            inclusion("0xmissing", "0x03", 1),
        ];
        let txs = vec![
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 20 * GWEI, 2 * GWEI),
        ];
        let bids = calculate_gas_bidding(&records, &txs).unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].hash, "0xb");
        assert_eq!(bids[0].gas_fluctuation_gwei, 0.0);
        assert_eq!(bids[0].gas_fluctuation_percent, 0.0);
    }

    #[test]
    fn blobs_of_one_transaction_collapse_into_one_bid() {
        let records = vec![
            inclusion("0xa", "0x01", 1),
            inclusion("0xb", "0x02", 1),
            inclusion("0xb", "0x03", 1),
        ];
        let txs = vec![
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 22 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 22 * GWEI, 2 * GWEI),
        ];
        let bids = calculate_gas_bidding(&records, &txs).unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].gas_fluctuation_gwei, 2.0);
        assert_eq!(bids[0].gas_fluctuation_percent, 10.0);
    }

    #[test]
    fn zero_effective_gas_price_makes_premium_undefined() {
        let records = vec![inclusion("0xa", "0x01", 1), inclusion("0xb", "0x02", 1)];
        let txs = vec![execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI), execution_tx("0xb", 11, 0, 0)];
        assert!(calculate_gas_bidding(&records, &txs).unwrap().is_empty());
    }

    #[test]
    fn zero_base_fee_makes_fluctuation_percent_undefined() {
        let records = vec![inclusion("0xa", "0x01", 1), inclusion("0xb", "0x02", 1)];
        let txs = vec![
            execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI),
            execution_tx("0xb", 11, 5 * GWEI, 5 * GWEI),
        ];
        assert!(calculate_gas_bidding(&records, &txs).unwrap().is_empty());
    }

    #[test]
    fn empty_inputs_yield_no_bids() {
        assert!(calculate_gas_bidding(&[], &[]).unwrap().is_empty());
        let txs = vec![execution_tx("0xa", 10, 20 * GWEI, 2 * GWEI)];
        assert!(calculate_gas_bidding(&[], &txs).unwrap().is_empty());
    }
}
