/// Stochastic mechanics: noise for synthetic players.
/// Note: uses `bevy_prng::WyRand` behind a `RefCell` so callers
/// can keep closures `Fn` while mutating RNG state.
use bevy_prng::WyRand;
use rand_core::RngCore;
use std::cell::RefCell;

#[inline]
fn unit(r: &mut WyRand) -> f64 {
    ((r.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Gaussian(0,1) via Box–Muller.
#[inline]
pub fn gaussian01(rng: &RefCell<WyRand>) -> f64 {
    let mut r = rng.borrow_mut();
    // Shift u1 off zero so ln() stays finite.
    let u1 = unit(&mut r).max(f64::MIN_POSITIVE);
    let u2 = unit(&mut r);
    drop(r);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Multiplicative earning jitter: max(0, 1 + N(0,1)*jitter).
#[inline]
pub fn rate_noise(rng: &RefCell<WyRand>, jitter: f64) -> f64 {
    if jitter <= 0.0 {
        return 1.0;
    }
    (1.0 + gaussian01(rng) * jitter).max(0.0)
}
