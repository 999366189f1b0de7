//! Request and response bodies of the Hypersync JSON API.

use eyre::{Result, WrapErr, bail};
use pipeline::ExecutionTxRecord;
use serde::{Deserialize, Serialize};

/// Transaction fields requested from the indexer.
pub const TRANSACTION_FIELDS: [&str; 12] = [
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

/// Response of `GET /height`
#[derive(Debug, Deserialize)]
pub struct HeightResponse {
    /// Latest indexed block
    pub height: u64,
}

/// Transactions matching any of the listed senders
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransactionSelection {
    /// Lowercase sender addresses
    pub from: Vec<String>,
}

/// Columns to return
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldSelection {
    /// Transaction columns
    pub transaction: Vec<String>,
}

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Query {
    /// First block, inclusive
    pub from_block: u64,
    /// Last block, exclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
    /// Transaction filters
    pub transactions: Vec<TransactionSelection>,
    /// Returned columns
    pub field_selection: FieldSelection,
}

impl Query {
    /// Query for transactions sent by `senders` from `from_block` on.
    pub fn transactions_from(senders: Vec<String>, from_block: u64, to_block: Option<u64>) -> Self {
        Self {
            from_block,
            to_block,
            transactions: vec![TransactionSelection { from: senders }],
            field_selection: FieldSelection {
                transaction: TRANSACTION_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            },
        }
    }
}

/// One page of a `POST /query` response
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    /// Result batches
    #[serde(default)]
    pub data: Vec<ResponseData>,
    /// Latest block the indexer has
    pub archive_height: Option<u64>,
    /// Block to continue from
    pub next_block: u64,
}

/// A batch of returned rows
#[derive(Debug, Default, Deserialize)]
pub struct ResponseData {
    /// Transactions
    #[serde(default)]
    pub transactions: Vec<TransactionData>,
}

/// A quantity encoded either as a JSON number or as a `0x` hex string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    /// JSON number
    Number(u64),
    /// Hex string
    Hex(String),
}

impl Quantity {
    /// Numeric value of the quantity.
    pub fn to_u128(&self) -> Result<u128> {
        match self {
            Self::Number(n) => Ok(u128::from(*n)),
            Self::Hex(s) => parse_hex_quantity(s),
        }
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_quantity(value: &str) -> Result<u128> {
    let Some(digits) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) else {
        bail!("quantity `{value}` is not 0x-prefixed");
    };
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).wrap_err_with(|| format!("invalid hex quantity `{value}`"))
}

/// A transaction as returned by the indexer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionData {
    /// Transaction hash
    pub hash: Option<String>,
    /// Block number
    pub block_number: Option<Quantity>,
    /// Sender
    pub from: Option<String>,
    /// Recipient
    pub to: Option<String>,
    /// Index within the block
    pub transaction_index: Option<Quantity>,
    /// Gas limit
    pub gas: Option<Quantity>,
    /// Gas price
    pub gas_price: Option<Quantity>,
    /// Effective gas price
    pub effective_gas_price: Option<Quantity>,
    /// Gas used
    pub gas_used: Option<Quantity>,
    /// Cumulative gas used
    pub cumulative_gas_used: Option<Quantity>,
    /// Max fee per gas
    pub max_fee_per_gas: Option<Quantity>,
    /// Max priority fee per gas
    pub max_priority_fee_per_gas: Option<Quantity>,
}

fn quantity(field: &str, value: Option<&Quantity>) -> Result<Option<u128>> {
    value.map(Quantity::to_u128).transpose().wrap_err_with(|| format!("field `{field}`"))
}

impl TryFrom<TransactionData> for ExecutionTxRecord {
    type Error = eyre::Error;

    fn try_from(tx: TransactionData) -> Result<Self> {
        let Some(hash) = tx.hash else {
            bail!("transaction without `hash`");
        };
        let Some(block_number) = quantity("block_number", tx.block_number.as_ref())? else {
            bail!("transaction {hash} without `block_number`");
        };
        let block_number = u64::try_from(block_number)
            .wrap_err_with(|| format!("transaction {hash}: field `block_number` out of range"))?;
        let transaction_index = quantity("transaction_index", tx.transaction_index.as_ref())?
            .map(u64::try_from)
            .transpose()
            .wrap_err_with(|| format!("transaction {hash}: field `transaction_index` out of range"))?;

        Ok(Self {
            block_number,
            from: tx.from.map(|a| a.to_lowercase()),
            to: tx.to.map(|a| a.to_lowercase()),
            transaction_index,
            gas: quantity("gas", tx.gas.as_ref())?,
            gas_price: quantity("gas_price", tx.gas_price.as_ref())?,
            effective_gas_price: quantity("effective_gas_price", tx.effective_gas_price.as_ref())?,
            gas_used: quantity("gas_used", tx.gas_used.as_ref())?,
            cumulative_gas_used: quantity("cumulative_gas_used", tx.cumulative_gas_used.as_ref())?,
            max_fee_per_gas: quantity("max_fee_per_gas", tx.max_fee_per_gas.as_ref())?,
            max_priority_fee_per_gas: quantity(
                "max_priority_fee_per_gas",
                tx.max_priority_fee_per_gas.as_ref(),
            )?,
            hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_quantities() {
        assert_eq!(parse_hex_quantity("0x4e3b29200").unwrap(), 21_000_000_000);
        assert_eq!(parse_hex_quantity("0x").unwrap(), 0);
        assert!(parse_hex_quantity("123").is_err());
        assert!(parse_hex_quantity("0xzz").is_err());
    }

    #[test]
    fn query_body_shape() {
        let query = Query::transactions_from(vec!["0xabc".to_owned()], 100, None);
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["from_block"], 100);
        assert!(body.get("to_block").is_none());
        assert_eq!(body["transactions"], json!([{ "from": ["0xabc"] }]));
        assert_eq!(body["field_selection"]["transaction"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn transaction_converts_to_record() {
        let tx: TransactionData = serde_json::from_value(json!({
            "hash": "0xfeed",
            "block_number": 19_000_000,
            "from": "0x5050F69A9786F081509234F1A7F4684B5E5B76C9",
            "to": null,
            "transaction_index": "0x3",
            "gas": "0x5208",
            "effective_gas_price": "0x4e3b29200",
            "max_priority_fee_per_gas": "0x3b9aca00",
        }))
        .unwrap();
        let record = ExecutionTxRecord::try_from(tx).unwrap();
        assert_eq!(record.hash, "0xfeed");
        assert_eq!(record.block_number, 19_000_000);
        assert_eq!(record.from.as_deref(), Some("0x5050f69a9786f081509234f1a7f4684b5e5b76c9"));
        assert_eq!(record.to, None);
        assert_eq!(record.transaction_index, Some(3));
        assert_eq!(record.gas, Some(21_000));
        assert_eq!(record.effective_gas_price, Some(21_000_000_000));
        assert_eq!(record.max_priority_fee_per_gas, Some(1_000_000_000));
        assert_eq!(record.max_fee_per_gas, None);
    }

    #[test]
    fn invalid_quantity_names_the_field() {
        let tx: TransactionData = serde_json::from_value(json!({
            "hash": "0xfeed",
            "block_number": 1,
            "gas_price": "0xnope",
        }))
        .unwrap();
        let err = ExecutionTxRecord::try_from(tx).unwrap_err();
        assert!(format!("{err:#}").contains("gas_price"), "{err:#}");
    }
}
