//! Typical priority fee premium per inclusion latency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bidding::GasBiddingRecord;

/// Typical bid and price paid for one inclusion latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidPremiumSummary {
    /// Whole slots waited
    pub inclusion_slot_count: u64,
    /// Median priority fee premium (percent)
    pub priority_fee_bid_percent_premium: f64,
    /// Mean effective gas price (gwei)
    pub effective_gas_price_gwei: f64,
}

/// Median of `values`, averaging the two middle values for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median =
        if values.len() % 2 == 0 { (values[mid - 1] + values[mid]) / 2.0 } else { values[mid] };
    median.is_finite().then_some(median)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.is_finite().then_some(mean)
}

/// Summarize bids per inclusion slot count, ascending.
pub fn summarize_bid_premium(bids: &[GasBiddingRecord]) -> Vec<BidPremiumSummary> {
    let mut groups: BTreeMap<u64, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for bid in bids {
        let (premiums, prices) = groups.entry(bid.inclusion_slot_count).or_default();
        premiums.push(bid.priority_fee_bid_percent_premium);
        prices.push(bid.effective_gas_price_gwei);
    }

    let summary: Vec<_> = groups
        .into_iter()
        .filter_map(|(inclusion_slot_count, (mut premiums, prices))| {
            Some(BidPremiumSummary {
                inclusion_slot_count,
                priority_fee_bid_percent_premium: median(&mut premiums)?,
                effective_gas_price_gwei: mean(&prices)?,
            })
        })
        .collect();
    debug!(bids = bids.len(), groups = summary.len(), "summarized bid premium");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(slots: u64, premium: f64, price: f64) -> GasBiddingRecord {
        GasBiddingRecord {
            hash: format!("0x{slots}{premium}"),
            block_number: 1,
            inclusion_slot_count: slots,
            submission_count: 1,
            effective_gas_price_gwei: price,
            max_fee_per_gas_gwei: price * 2.0,
            max_priority_fee_per_gas_gwei: price * premium / 100.0,
            priority_fee_bid_percent_premium: premium,
            min_block_gas_gwei: price,
            gas_fluctuation_gwei: 0.0,
            gas_fluctuation_percent: 0.0,
        }
    }

    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn groups_are_sorted_by_slot_count() {
        let bids = vec![
            bid(3, 50.0, 10.0),
            bid(1, 10.0, 20.0),
            bid(1, 30.0, 40.0),
            bid(1, 20.0, 30.0),
            bid(2, 5.0, 8.0),
            bid(2, 15.0, 12.0),
        ];
        let summary = summarize_bid_premium(&bids);
        assert_eq!(
            summary,
            vec![
                BidPremiumSummary {
                    inclusion_slot_count: 1,
                    priority_fee_bid_percent_premium: 20.0,
                    effective_gas_price_gwei: 30.0,
                },
                BidPremiumSummary {
                    inclusion_slot_count: 2,
                    priority_fee_bid_percent_premium: 10.0,
                    effective_gas_price_gwei: 10.0,
                },
                BidPremiumSummary {
                    inclusion_slot_count: 3,
                    priority_fee_bid_percent_premium: 50.0,
                    effective_gas_price_gwei: 10.0,
                },
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert!(summarize_bid_premium(&[]).is_empty());
    }
}
