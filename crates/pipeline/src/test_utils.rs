//! Row builders shared by unit tests.

use crate::models::{CanonicalBlobRecord, ExecutionTxRecord, MempoolObservation};

pub(crate) fn observation(ts: i64, hash: &str, nonce: u64, blobs: &[&str]) -> MempoolObservation {
    MempoolObservation {
        event_date_time_ms: ts,
        hash: hash.to_owned(),
        from: "0xsender".to_owned(),
        to: Some("0xinbox".to_owned()),
        nonce,
        blob_hashes: blobs.iter().map(|b| (*b).to_owned()).collect(),
        blob_sidecars_size: Some(131_072.0),
        blob_sidecars_empty_size: Some(0.0),
        fill_percentage: Some(100.0),
        gas_price: Some(1e9),
        gas_tip_cap: Some(1e9),
        gas_fee_cap: Some(2e9),
        blob_gas: Some(131_072.0),
        blob_gas_fee_cap: Some(1e9),
        meta_network_name: "mainnet".to_owned(),
    }
}

pub(crate) fn canonical(slot: u64, slot_start_ms: i64, versioned_hash: &str) -> CanonicalBlobRecord {
    CanonicalBlobRecord {
        slot,
        slot_start_ms,
        epoch: slot / 32,
        blob_index: 0,
        versioned_hash: versioned_hash.to_owned(),
        blob_size: 131_072,
        meta_network_name: "mainnet".to_owned(),
    }
}

pub(crate) fn execution_tx(
    hash: &str,
    block_number: u64,
    effective_gas_price: u128,
    max_priority_fee_per_gas: u128,
) -> ExecutionTxRecord {
    ExecutionTxRecord {
        hash: hash.to_owned(),
        block_number,
        from: Some("0xsender".to_owned()),
        to: Some("0xinbox".to_owned()),
        transaction_index: Some(0),
        gas: Some(21_000),
        gas_price: Some(effective_gas_price),
        effective_gas_price: Some(effective_gas_price),
        gas_used: Some(21_000),
        cumulative_gas_used: Some(21_000),
        max_fee_per_gas: Some(effective_gas_price * 2),
        max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
    }
}
