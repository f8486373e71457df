/// Amount helpers shared by the accrual and governor systems.

/// Round to 6 decimal places (balance precision).
#[inline]
pub fn round6(x: f64) -> f64 {
    ((x + f64::EPSILON) * 1e6).round() / 1e6
}

/// Whole, non-negative coin count; NaN and negatives collapse to 0.
#[inline]
pub fn whole_coins(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 { x.floor() } else { 0.0 }
}

/// Milliseconds to minutes, never below `floor_min` (avoids dividing by ~0).
#[inline]
pub fn minutes(ms: i64, floor_min: f64) -> f64 {
    (ms as f64 / 60_000.0).max(floor_min)
}
