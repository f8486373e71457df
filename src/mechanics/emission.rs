/// Emission mechanics: turning a token supply budget into per-user coin rates.

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// tokens/day = supply / (365 * years).
#[inline]
pub fn tokens_per_day(total_tokens: f64, years: f64) -> f64 {
    total_tokens / (DAYS_PER_YEAR * years)
}

/// Coins per user per day for an assumed active-user baseline.
#[inline]
pub fn coins_per_user_day(tokens_per_day: f64, users_baseline: f64, coins_per_token: f64) -> f64 {
    tokens_per_day / users_baseline * coins_per_token
}

#[inline]
pub fn per_minute(per_day: f64) -> f64 {
    per_day / MINUTES_PER_DAY
}

/// Daily cap with slack above the target, floored to whole coins.
#[inline]
pub fn daily_cap(coins_per_user_day: f64, slack: f64) -> f64 {
    (coins_per_user_day * slack).floor()
}
