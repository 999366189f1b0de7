//! Table schemas and validation of rehydrated record sets.

use eyre::{Result, WrapErr, bail};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    BidPremiumSummary, GasBiddingRecord, SlotCountBreakdown, SlotInclusionRecord,
    models::{CanonicalBlobRecord, ExecutionTxRecord, MempoolObservation},
};

/// A table row type with a fixed, named column set.
pub trait TableSchema: Serialize + DeserializeOwned {
    /// Table name used in error messages and file names.
    const NAME: &'static str;
    /// Columns every row must carry.
    const COLUMNS: &'static [&'static str];
}

/// Decode generic JSON records into typed rows.
///
/// Every record must be an object holding every column of `T`; a `null` value
/// is accepted, an absent key is not.
pub fn decode_table<T: TableSchema>(records: Vec<Value>) -> Result<Vec<T>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let Some(object) = record.as_object() else {
                bail!("table `{}` row {i} is not a record", T::NAME);
            };
            if let Some(column) = T::COLUMNS.iter().find(|c| !object.contains_key(**c)) {
                bail!("table `{}` row {i} is missing expected column `{column}`", T::NAME);
            }
            serde_json::from_value(record)
                .wrap_err_with(|| format!("table `{}` row {i} has an invalid value", T::NAME))
        })
        .collect()
}

/// Encode typed rows as JSON records.
pub fn encode_table<T: TableSchema>(rows: &[T]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row)
                .wrap_err_with(|| format!("failed to encode `{}` row", T::NAME))
        })
        .collect()
}

impl TableSchema for MempoolObservation {
    const NAME: &'static str = "mempool_transaction";
    const COLUMNS: &'static [&'static str] = &[
        "event_date_time_ms",
        "hash",
        "from",
        "to",
        "nonce",
        "blob_hashes",
        "blob_sidecars_size",
        "blob_sidecars_empty_size",
        "fill_percentage",
        "gas_price",
        "gas_tip_cap",
        "gas_fee_cap",
        "blob_gas",
        "blob_gas_fee_cap",
        "meta_network_name",
    ];
}

impl TableSchema for CanonicalBlobRecord {
    const NAME: &'static str = "canonical_beacon_blob_sidecar";
    const COLUMNS: &'static [&'static str] = &[
        "slot",
        "slot_start_ms",
        "epoch",
        "blob_index",
        "versioned_hash",
        "blob_size",
        "meta_network_name",
    ];
}

impl TableSchema for ExecutionTxRecord {
    const NAME: &'static str = "execution_transaction";
    const COLUMNS: &'static [&'static str] = &[
        "hash",
        "block_number",
        "from",
        "to",
        "transaction_index",
        "gas",
        "gas_price",
        "effective_gas_price",
        "gas_used",
        "cumulative_gas_used",
        "max_fee_per_gas",
        "max_priority_fee_per_gas",
    ];
}

impl TableSchema for SlotInclusionRecord {
    const NAME: &'static str = "slot_inclusion";
    const COLUMNS: &'static [&'static str] = &[
        "versioned_hash",
        "hash",
        "from",
        "to",
        "nonce",
        "submission_count",
        "earliest_seen_ms",
        "latest_seen_ms",
        "blob_hashes_length",
        "blob_sidecars_size",
        "fill_percentage",
        "gas_price",
        "gas_tip_cap",
        "gas_fee_cap",
        "blob_gas",
        "blob_gas_fee_cap",
        "slot",
        "slot_start_ms",
        "epoch",
        "inclusion_time_seconds",
        "inclusion_slot_count",
        "rolling_inclusion_slot_count_50",
        "target_slot_count",
    ];
}

impl TableSchema for SlotCountBreakdown {
    const NAME: &'static str = "slot_count_breakdown";
    const COLUMNS: &'static [&'static str] = &["one_slot", "two_slots", "three_plus_slots"];
}

impl TableSchema for GasBiddingRecord {
    const NAME: &'static str = "gas_bidding";
    const COLUMNS: &'static [&'static str] = &[
        "hash",
        "block_number",
        "inclusion_slot_count",
        "submission_count",
        "effective_gas_price_gwei",
        "max_fee_per_gas_gwei",
        "max_priority_fee_per_gas_gwei",
        "priority_fee_bid_percent_premium",
        "min_block_gas_gwei",
        "gas_fluctuation_gwei",
        "gas_fluctuation_percent",
    ];
}

impl TableSchema for BidPremiumSummary {
    const NAME: &'static str = "bid_premium";
    const COLUMNS: &'static [&'static str] = &[
        "inclusion_slot_count",
        "priority_fee_bid_percent_premium",
        "effective_gas_price_gwei",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical_json() -> Value {
        json!({
            "slot": 100,
            "slot_start_ms": 1_200_000,
            "epoch": 3,
            "blob_index": 0,
            "versioned_hash": "0x01aa",
            "blob_size": 131072,
            "meta_network_name": "mainnet",
        })
    }

    fn columns_of<T: TableSchema>(row: &T) -> Vec<String> {
        let value = serde_json::to_value(row).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn declared<T: TableSchema>() -> Vec<String> {
        let mut cols: Vec<_> = T::COLUMNS.iter().map(|c| (*c).to_owned()).collect();
        cols.sort();
        cols
    }

    #[test]
    fn decodes_complete_records() {
        let rows: Vec<CanonicalBlobRecord> = decode_table(vec![canonical_json()]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slot, 100);
        assert_eq!(rows[0].versioned_hash, "0x01aa");
    }

    #[test]
    fn missing_column_names_table_and_column() {
        let mut record = canonical_json();
        record.as_object_mut().unwrap().remove("versioned_hash");
        let err = decode_table::<CanonicalBlobRecord>(vec![canonical_json(), record]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("canonical_beacon_blob_sidecar"), "{msg}");
        assert!(msg.contains("row 1"), "{msg}");
        assert!(msg.contains("`versioned_hash`"), "{msg}");
    }

    #[test]
    fn null_values_are_accepted_for_optional_columns() {
        let record = json!({
            "hash": "0x11",
            "block_number": 7,
            "from": null,
            "to": null,
            "transaction_index": null,
            "gas": null,
            "gas_price": null,
            "effective_gas_price": null,
            "gas_used": null,
            "cumulative_gas_used": null,
            "max_fee_per_gas": null,
            "max_priority_fee_per_gas": null,
        });
        let rows: Vec<ExecutionTxRecord> = decode_table(vec![record]).unwrap();
        assert_eq!(rows[0].effective_gas_price, None);
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = decode_table::<CanonicalBlobRecord>(vec![json!([1, 2])]).unwrap_err();
        assert!(err.to_string().contains("is not a record"));
    }

    #[test]
    fn declared_columns_match_serialized_fields() {
        let canonical: CanonicalBlobRecord = serde_json::from_value(canonical_json()).unwrap();
        assert_eq!(columns_of(&canonical), declared::<CanonicalBlobRecord>());

        let breakdown = SlotCountBreakdown { one_slot: 1, two_slots: 2, three_plus_slots: 3 };
        assert_eq!(columns_of(&breakdown), declared::<SlotCountBreakdown>());

        let premium = BidPremiumSummary {
            inclusion_slot_count: 1,
            priority_fee_bid_percent_premium: 10.0,
            effective_gas_price_gwei: 2.0,
        };
        assert_eq!(columns_of(&premium), declared::<BidPremiumSummary>());
    }

    #[test]
    fn encode_then_decode_preserves_rows() {
        let canonical: CanonicalBlobRecord = serde_json::from_value(canonical_json()).unwrap();
        let encoded = encode_table(std::slice::from_ref(&canonical)).unwrap();
        let decoded: Vec<CanonicalBlobRecord> = decode_table(encoded).unwrap();
        assert_eq!(decoded, vec![canonical]);
    }
}
