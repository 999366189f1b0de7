/// Duration of a beacon chain slot in seconds.
pub const SLOT_DURATION_SECS: f64 = 12.0;

/// Number of slots a blob transaction is designed to wait before inclusion.
pub const TARGET_SLOT_COUNT: u64 = 2;

/// Number of execution blocks produced per day at one block per slot.
pub const BLOCKS_PER_DAY: u64 = 7200;

/// Default network label used by the mempool and beacon chain datasets.
pub const DEFAULT_NETWORK: &str = "mainnet";
