/// Control mechanics: bounded multiplicative feedback.

/// Dead-band multiplicative step.
///
/// Above `target * (1 + band)` the value is multiplied by `up`, below
/// `target * (1 - band)` by `down`; inside the band it is unchanged. The
/// result is clamped to `[lo, hi]`.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn deadband_step(
    x: f64,
    observed: f64,
    target: f64,
    band: f64,
    up: f64,
    down: f64,
    lo: f64,
    hi: f64,
) -> f64 {
    if observed > target * (1.0 + band) {
        (x * up).min(hi)
    } else if observed < target * (1.0 - band) {
        (x * down).max(lo)
    } else {
        x
    }
}

/// True when `observed` sits inside the dead band around `target`.
#[inline]
pub fn within_band(observed: f64, target: f64, band: f64) -> bool {
    observed <= target * (1.0 + band) && observed >= target * (1.0 - band)
}
