/// Look-back window of a query
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeRange {
    /// Data from the last 24 hours
    Last24Hours,
    /// Data from the last 7 days
    Last7Days,
    /// Data from the last 30 days
    Last30Days,
    /// Data from a custom duration in seconds (clamped to 30 days)
    Custom(u64),
}

impl TimeRange {
    /// Maximum allowed range in seconds (30 days).
    const MAX_SECONDS: u64 = 30 * 24 * 3600;

    /// Create a [`TimeRange`] from a [`chrono::Duration`], clamping to the
    /// allowed maximum of thirty days.
    pub fn from_duration(duration: chrono::Duration) -> Self {
        let secs = duration.num_seconds().clamp(0, Self::MAX_SECONDS as i64) as u64;
        match secs {
            86400 => Self::Last24Hours,
            604800 => Self::Last7Days,
            2592000 => Self::Last30Days,
            _ => Self::Custom(secs),
        }
    }

    /// Range covering the last `days` days.
    pub fn from_days(days: u64) -> Self {
        Self::from_duration(chrono::Duration::days(days.min(Self::MAX_SECONDS / 86400) as i64))
    }

    /// Return the `ClickHouse` interval string for this range.
    pub fn interval(&self) -> String {
        match self {
            Self::Last24Hours => "24 HOUR".to_owned(),
            Self::Last7Days => "7 DAY".to_owned(),
            Self::Last30Days => "30 DAY".to_owned(),
            Self::Custom(sec) => format!("{sec} SECOND"),
        }
    }

    /// Return the duration in seconds for this range.
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Last24Hours => 86400,
            Self::Last7Days => 604800,
            Self::Last30Days => 2592000,
            Self::Custom(sec) => *sec,
        }
    }
}
