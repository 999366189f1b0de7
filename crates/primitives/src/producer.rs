use std::collections::BTreeSet;

use alloy_primitives::{Address, address};
use eyre::{Result, bail};
use serde::{Deserialize, Serialize};

/// Sequencer addresses of the rollups tracked when no producer is configured.
const DEFAULT_SEQUENCERS: [(Address, &str); 9] = [
    (address!("0xC1b634853Cb333D3aD8663715b08f41A3Aec47cc"), "arbitrum"),
    (address!("0x5050F69a9786F081509234F1a7F4684b5E5b76C9"), "base"),
    (address!("0x6887246668a3b87F54DeB3b94Ba47a6f63F32985"), "optimism"),
    (address!("0x000000633b68f5d8d3a86593ebb815b4663bcbe0"), "taiko"),
    (address!("0x415c8893d514f9bc5211d36eeda4183226b84aa7"), "blast"),
    (address!("0xa9268341831eFa4937537bc3e9EB36DbecE83C7e"), "linea"),
    (address!("0xcF2898225ED05Be911D3709d9417e86E0b4Cfc8f"), "scroll"),
    (address!("0x0D3250c3D5FAcb74Ac15834096397a3Ef790ec99"), "zksync"),
    (address!("0x2c169dfe5fbba12957bdd0ba47d9cedbfe260ca7"), "starknet"),
];

/// The sender(s) whose blob transactions are analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobProducer {
    /// A single sender address.
    Single(Address),
    /// A named collection of sender addresses.
    Group {
        /// Sender addresses
        addresses: Vec<Address>,
        /// Labels for the addresses, index-aligned. May be empty.
        names: Vec<String>,
    },
}

impl Default for BlobProducer {
    fn default() -> Self {
        Self::Group {
            addresses: DEFAULT_SEQUENCERS.iter().map(|(addr, _)| *addr).collect(),
            names: DEFAULT_SEQUENCERS.iter().map(|(_, name)| (*name).to_owned()).collect(),
        }
    }
}

impl BlobProducer {
    /// Build a producer from configured addresses and optional names.
    ///
    /// No addresses yields the default rollup group, one unnamed address a
    /// [`BlobProducer::Single`], anything else a [`BlobProducer::Group`].
    pub fn from_parts(addresses: Vec<Address>, names: Vec<String>) -> Result<Self> {
        if !names.is_empty() && names.len() != addresses.len() {
            bail!(
                "blob producer names ({}) must match the number of addresses ({})",
                names.len(),
                addresses.len()
            );
        }
        match addresses.as_slice() {
            [] => Ok(Self::default()),
            [single] if names.is_empty() => Ok(Self::Single(*single)),
            _ => Ok(Self::Group { addresses, names }),
        }
    }

    /// All sender addresses of this producer.
    pub fn addresses(&self) -> Vec<Address> {
        match self {
            Self::Single(addr) => vec![*addr],
            Self::Group { addresses, .. } => addresses.clone(),
        }
    }

    /// Label for `addr`, if the producer carries names.
    pub fn name_of(&self, addr: &Address) -> Option<&str> {
        match self {
            Self::Single(_) => None,
            Self::Group { addresses, names } => addresses
                .iter()
                .position(|a| a == addr)
                .and_then(|i| names.get(i))
                .map(String::as_str),
        }
    }

    /// Resolve into the normalized filter used by queries and joins.
    pub fn filter(&self) -> ProducerFilter {
        ProducerFilter::new(self.addresses())
    }
}

/// Deduplicated, lowercase hex sender addresses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProducerFilter {
    addresses: BTreeSet<String>,
}

impl ProducerFilter {
    /// Create a filter for the given addresses.
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self { addresses: addresses.into_iter().map(|a| a.to_string().to_lowercase()).collect() }
    }

    /// Lowercase hex addresses in ascending order.
    pub fn addresses(&self) -> Vec<String> {
        self.addresses.iter().cloned().collect()
    }

    /// Whether `sender` (any hex casing) is part of the filter.
    pub fn contains(&self, sender: &str) -> bool {
        self.addresses.contains(&sender.to_lowercase())
    }

    /// Number of distinct addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the filter has no addresses.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Address = address!("0x5050F69a9786F081509234F1a7F4684b5E5b76C9");
    const TAIKO: Address = address!("0x000000633b68f5d8d3a86593ebb815b4663bcbe0");

    #[test]
    fn no_addresses_uses_default_group() {
        let producer = BlobProducer::from_parts(vec![], vec![]).unwrap();
        assert_eq!(producer, BlobProducer::default());
        assert_eq!(producer.addresses().len(), 9);
        assert_eq!(producer.name_of(&BASE), Some("base"));
    }

    #[test]
    fn single_unnamed_address_is_single() {
        let producer = BlobProducer::from_parts(vec![BASE], vec![]).unwrap();
        assert_eq!(producer, BlobProducer::Single(BASE));
        assert_eq!(producer.name_of(&BASE), None);
    }

    #[test]
    fn named_single_address_is_group() {
        let producer = BlobProducer::from_parts(vec![BASE], vec!["base".to_owned()]).unwrap();
        assert!(matches!(producer, BlobProducer::Group { .. }));
        assert_eq!(producer.name_of(&BASE), Some("base"));
    }

    #[test]
    fn mismatched_names_are_rejected() {
        let err = BlobProducer::from_parts(vec![BASE, TAIKO], vec!["base".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("must match"));
    }

    #[test]
    fn filter_is_lowercase_and_deduplicated() {
        let producer = BlobProducer::Group { addresses: vec![BASE, BASE, TAIKO], names: vec![] };
        let filter = producer.filter();
        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter.addresses(),
            vec![
                "0x000000633b68f5d8d3a86593ebb815b4663bcbe0".to_owned(),
                "0x5050f69a9786f081509234f1a7f4684b5e5b76c9".to_owned(),
            ]
        );
        assert!(filter.contains("0x5050F69a9786F081509234F1a7F4684b5E5b76C9"));
    }
}
