/// Number of wei in one gwei.
pub const WEI_PER_GWEI: f64 = 1e9;

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Convert wei to gwei with 3 decimal precision.
pub fn wei_to_gwei(value: u128) -> f64 {
    round_to(value as f64 / WEI_PER_GWEI, 3)
}

/// Convert optional wei to gwei.
pub fn opt_wei_to_gwei(value: Option<u128>) -> Option<f64> {
    value.map(wei_to_gwei)
}

/// Ratio of `numerator` to `denominator` as a percentage.
///
/// Returns `None` when the denominator is zero or the result is not finite.
pub fn percent_of(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let pct = numerator / denominator * 100.0;
    pct.is_finite().then_some(pct)
}
