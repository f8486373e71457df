//! Offline simulation: replay production missed while the game was not
//! running, without stepping frame by frame.
//!
//! Each production line works through its current job at `rate` cost units
//! per second. A finished job pays `reward_per_completion` and the next job
//! starts with cost and reward scaled by their growth factors. Lines are
//! independent; their rewards are summed.
//!
//! The returned total is raw. Callers discount it by
//! [`OfflinePolicy::efficiency`] and pass it through the governor before
//! crediting anyone.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfflinePolicy {
    /// Replay at most this much time, however long the player was away.
    pub cap_hours: f64,
    /// Fraction of the raw offline total that is worth awarding.
    pub efficiency: f64,
    /// Absences at or below this are ignored.
    pub resume_threshold_secs: f64,
    /// Per-line completion limit for a single replay.
    pub max_completions: u64,
}

impl Default for OfflinePolicy {
    fn default() -> Self {
        Self {
            cap_hours: 6.0,
            efficiency: 0.30,
            resume_threshold_secs: 1.0,
            max_completions: 1_000_000,
        }
    }
}

impl OfflinePolicy {
    pub fn cap_secs(&self) -> f64 {
        self.cap_hours * 3600.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLine {
    /// Cost units worked off per second.
    pub rate: f64,
    pub reward_per_completion: f64,
    /// Full cost of the current job.
    pub cost_to_complete: f64,
    /// Cost still outstanding on the current job.
    pub remaining: f64,
    pub cost_growth: f64,
    pub reward_growth: f64,
    pub completions: u64,
}

impl ProductionLine {
    /// Line with constant cost and reward, starting a fresh job.
    pub fn new(rate: f64, reward_per_completion: f64, cost_to_complete: f64) -> Self {
        Self {
            rate,
            reward_per_completion,
            cost_to_complete,
            remaining: cost_to_complete,
            cost_growth: 1.0,
            reward_growth: 1.0,
            completions: 0,
        }
    }

    pub fn with_growth(mut self, cost_growth: f64, reward_growth: f64) -> Self {
        self.cost_growth = cost_growth;
        self.reward_growth = reward_growth;
        self
    }

    fn is_workable(&self) -> bool {
        self.rate.is_finite()
            && self.rate > 0.0
            && self.remaining.is_finite()
            && self.remaining > 0.0
            && self.cost_to_complete.is_finite()
            && self.cost_to_complete > 0.0
    }

    /// Work for up to `secs`. Returns the reward earned.
    fn advance(&mut self, secs: f64, max_completions: u64) -> f64 {
        let mut remain = secs;
        let mut earned = 0.0;
        let mut done = 0u64;
        while remain > 0.0 && done < max_completions && self.is_workable() {
            let t_finish = self.remaining / self.rate;
            if t_finish <= remain {
                if self.reward_per_completion.is_finite() && self.reward_per_completion > 0.0 {
                    earned += self.reward_per_completion;
                }
                remain -= t_finish;
                done += 1;
                self.completions += 1;
                self.cost_to_complete *= self.cost_growth;
                self.reward_per_completion *= self.reward_growth;
                self.remaining = self.cost_to_complete;
            } else {
                self.remaining -= self.rate * remain;
                remain = 0.0;
            }
        }
        earned
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSimulator {
    pub policy: OfflinePolicy,
}

impl OfflineSimulator {
    pub fn new(policy: OfflinePolicy) -> Self {
        Self { policy }
    }

    /// Replay `elapsed_secs` (capped) across `lines`, advancing their progress
    /// in place. Returns the raw total; 0 for non-positive elapsed time.
    pub fn simulate(&self, elapsed_secs: f64, lines: &mut [ProductionLine]) -> f64 {
        if !(elapsed_secs > 0.0) {
            return 0.0;
        }
        let secs = elapsed_secs.min(self.policy.cap_secs());
        let total: f64 = lines
            .iter_mut()
            .map(|line| line.advance(secs, self.policy.max_completions))
            .sum();
        debug!(elapsed_secs, simulated_secs = secs, lines = lines.len(), total, "offline replay");
        total
    }

    /// Raw total discounted by the offline efficiency factor.
    pub fn discounted(&self, raw: f64) -> f64 {
        raw * self.policy.efficiency
    }
}
