/*!
`idle_accrual` — coin accrual for idle games under a global emission budget.

What it does
- Turns gameplay events into a growing per-event reward (stage table +
  accrual state) and keeps a 6-decimal running balance.
- Passes every raw reward through an emission governor: a rolling daily cap
  plus a difficulty factor nudged toward a target coins-per-minute rate.
- Replays missed production after an absence, capped in duration, as one
  lump-sum raw reward.
- Persists state through a `Result`-returning key/value store and degrades to
  in-memory state when the store fails.

How to use (call surface only)
- Build an [`config::EngineConfig`] (or take the default).
- Create a [`genres::idle::IdleSession`] with a store and a clock, then call
  `on_event`, `tick`, `suspend`, `resume`, `collect_offline`.
- Or use the systems directly:
  [`systems::accrual::AccrualEngine`],
  [`systems::emission_governor::Governor`],
  [`systems::offline_simulation::OfflineSimulator`].

What it does NOT do
- No rendering, no wallet signing, no on-chain contract semantics.
*/

/// Deterministic refinement: θ_{t+1} = update(θ_t, measure(simulate(θ_t))).
///
/// Stops early once `converged(θ_t, θ_{t+1})` holds; otherwise returns the
/// parameters after `max_iters` steps.
pub fn refine_det<P, D, M, Sim, Meas, Upd, Conv>(
    mut theta: P,
    mut simulate: Sim,
    mut measure: Meas,
    mut update: Upd,
    mut converged: Conv,
    max_iters: usize,
) -> P
where
    Sim: FnMut(&P) -> D,
    Meas: FnMut(&D) -> M,
    Upd: FnMut(&P, &M) -> P,
    Conv: FnMut(&P, &P) -> bool,
{
    for _ in 0..max_iters {
        let data = simulate(&theta);
        let pi = measure(&data);
        let theta_next = update(&theta, &pi);
        if converged(&theta, &theta_next) {
            return theta_next;
        }
        theta = theta_next;
    }
    theta
}

#[cfg(feature = "genre-idle")]
pub mod config;
pub mod error;
pub mod mechanics;
pub mod store;
pub mod systems;
pub mod genres;
