//! Steady-state preview for the emission governor.
//!
//! Runs a private governor against a synthetic player who earns a fixed raw
//! amount every second, one whole sampling window per refinement step, and
//! reports where the difficulty factor settles. Useful when picking
//! [`GovernorTuning`] or checking a new emission budget before shipping it.
//!
//! The cap is lifted for the preview so that only the rate controller is
//! measured.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_prng::WyRand;
use rand_core::SeedableRng;

use crate::mechanics::{control, stoch};
use crate::refine_det;
use crate::systems::emission_governor::{EmissionSchedule, Governor, GovernorTuning, WindowSample};
use crate::systems::sdk::{MS_PER_SEC, Millis, Outcome};

#[derive(Clone, Copy, Debug)]
pub struct SyntheticPlayer {
    pub raw_per_sec: f64,
    /// Relative Gaussian noise on each second's earnings; 0 for a steady player.
    pub jitter: f64,
    pub seed: u64,
}

impl SyntheticPlayer {
    pub fn steady(raw_per_sec: f64) -> Self {
        Self { raw_per_sec, jitter: 0.0, seed: 0 }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WindowObs {
    pub observed_per_min: f64,
    pub difficulty: f64,
}

/// θ = difficulty, π = the last window's observed award rate.
///
/// Converged when the observed rate sits inside the dead band, or the
/// difficulty is pinned at a bound and cannot move further.
pub fn preview(
    schedule: EmissionSchedule,
    tuning: GovernorTuning,
    player: SyntheticPlayer,
    max_windows: usize,
) -> Outcome<f64, WindowObs> {
    let uncapped = EmissionSchedule { daily_cap: f64::INFINITY, ..schedule };
    let gov = Rc::new(RefCell::new(Governor::new(uncapped, tuning, 0)));
    let rng = RefCell::new(WyRand::from_seed(player.seed.to_le_bytes()));
    let clock = Rc::new(RefCell::new(0 as Millis));
    let last = Rc::new(RefCell::new(WindowObs {
        observed_per_min: 0.0,
        difficulty: gov.borrow().difficulty(),
    }));
    let iters = Rc::new(RefCell::new(0usize));
    let done = Rc::new(RefCell::new(false));

    let simulate = {
        let gov = Rc::clone(&gov);
        let clock = Rc::clone(&clock);
        move |_d: &f64| -> Option<WindowSample> {
            let mut g = gov.borrow_mut();
            let secs = (tuning.window_ms.saturating_add(MS_PER_SEC - 1) / MS_PER_SEC).max(1);
            for _ in 0..secs {
                let now = *clock.borrow();
                g.award(player.raw_per_sec * stoch::rate_noise(&rng, player.jitter), now);
                *clock.borrow_mut() = now + MS_PER_SEC;
            }
            g.tick(*clock.borrow())
        }
    };

    let measure = |s: &Option<WindowSample>| -> WindowObs {
        s.map_or_else(WindowObs::default, |s| WindowObs {
            observed_per_min: s.observed_per_min,
            difficulty: s.difficulty_after,
        })
    };

    let update = {
        let last = Rc::clone(&last);
        move |_d: &f64, o: &WindowObs| -> f64 {
            *last.borrow_mut() = *o;
            o.difficulty
        }
    };

    let converged = {
        let last = Rc::clone(&last);
        let iters = Rc::clone(&iters);
        let done = Rc::clone(&done);
        let target = schedule.coins_per_user_min;
        move |before: &f64, after: &f64| -> bool {
            *iters.borrow_mut() += 1;
            let o = last.borrow();
            let pinned = before == after
                && (*after <= tuning.min_difficulty || *after >= tuning.max_difficulty);
            let ok = control::within_band(o.observed_per_min, target, tuning.band) || pinned;
            if ok {
                *done.borrow_mut() = true;
            }
            ok
        }
    };

    let theta0 = gov.borrow().difficulty();
    let theta = refine_det(theta0, simulate, measure, update, converged, max_windows);

    let obs = *last.borrow();
    let iters = *iters.borrow();
    let converged = *done.borrow();
    Outcome { theta, obs, iters, converged }
}
