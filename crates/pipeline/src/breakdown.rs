//! Distribution of included transactions over latency buckets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inclusion::SlotInclusionRecord;

/// Number of (transaction, slot count) pairs per latency bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCountBreakdown {
    /// Included within one slot
    pub one_slot: u64,
    /// Included in the second slot
    pub two_slots: u64,
    /// Included after three or more slots
    pub three_plus_slots: u64,
}

impl SlotCountBreakdown {
    /// Sum of all buckets.
    pub const fn total(&self) -> u64 {
        self.one_slot + self.two_slots + self.three_plus_slots
    }
}

/// Bucket the distinct (transaction hash, slot count) pairs of `records`.
///
/// A transaction whose blobs all landed at the same slot count is counted
/// once; one whose blobs landed at different counts is counted once per
/// count. Returns `None` when there are no records.
pub fn slot_count_breakdown(records: &[SlotInclusionRecord]) -> Option<SlotCountBreakdown> {
    if records.is_empty() {
        return None;
    }

    let pairs: HashSet<(&str, u64)> =
        records.iter().map(|r| (r.hash.as_str(), r.inclusion_slot_count)).collect();

    let mut breakdown = SlotCountBreakdown::default();
    for (_, count) in &pairs {
        debug_assert!(*count >= 1, "slot counts start at one");
        match count {
            1 => breakdown.one_slot += 1,
            2 => breakdown.two_slots += 1,
            _ => breakdown.three_plus_slots += 1,
        }
    }
    debug!(pairs = pairs.len(), ?breakdown, "computed slot count breakdown");
    Some(breakdown)
}
