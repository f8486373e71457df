//! Emission governor: converts raw rewards into awarded coins under a rolling
//! daily cap and a self-adjusting difficulty factor.
//!
//! The target rate is derived once from a token supply budget
//! ([`EmissionConfig::schedule`]). Every `window_ms` the governor compares the
//! coins it actually awarded with that target and nudges `difficulty` by a
//! bounded multiplicative step when the observed rate leaves the dead band.
//! Difficulty only moves at window boundaries, never per award.
//!
//! All time-dependent calls take an explicit `now` (see `systems::sdk`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::mechanics::{control, emission, units};
use crate::systems::sdk::{Millis, day_of};

/// Supply budget the schedule is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmissionConfig {
    pub total_tokens: f64,
    pub years: f64,
    pub users_baseline: f64,
    pub coins_per_token: f64,
    /// Daily cap as a multiple of the per-user daily target.
    pub cap_slack: f64,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            total_tokens: 100_000_000_000.0,
            years: 5.0,
            users_baseline: 10_000.0,
            coins_per_token: 1_000.0,
            cap_slack: 1.25,
        }
    }
}

impl EmissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("totalTokens", self.total_tokens),
            ("years", self.years),
            ("usersBaseline", self.users_baseline),
            ("coinsPerToken", self.coins_per_token),
            ("capSlack", self.cap_slack),
        ];
        for (name, v) in fields {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Emission(name));
            }
        }
        Ok(())
    }

    pub fn schedule(&self) -> EmissionSchedule {
        let tokens_per_day = emission::tokens_per_day(self.total_tokens, self.years);
        let coins_per_user_day =
            emission::coins_per_user_day(tokens_per_day, self.users_baseline, self.coins_per_token);
        EmissionSchedule {
            tokens_per_day,
            tokens_per_user_day: tokens_per_day / self.users_baseline,
            coins_per_user_day,
            coins_per_user_min: emission::per_minute(coins_per_user_day),
            daily_cap: emission::daily_cap(coins_per_user_day, self.cap_slack),
        }
    }
}

/// Derived targets. Computed once; not re-derived while running.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionSchedule {
    pub tokens_per_day: f64,
    pub tokens_per_user_day: f64,
    pub coins_per_user_day: f64,
    pub coins_per_user_min: f64,
    pub daily_cap: f64,
}

impl EmissionSchedule {
    /// Schedule pinned to an explicit cap and target rate.
    pub fn fixed(daily_cap: f64, coins_per_user_min: f64) -> Self {
        let coins_per_user_day = coins_per_user_min * emission::MINUTES_PER_DAY;
        Self {
            tokens_per_day: 0.0,
            tokens_per_user_day: 0.0,
            coins_per_user_day,
            coins_per_user_min,
            daily_cap,
        }
    }
}

impl Default for EmissionSchedule {
    fn default() -> Self {
        EmissionConfig::default().schedule()
    }
}

/// Controller constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernorTuning {
    pub window_ms: Millis,
    /// Half-width of the dead band as a fraction of the target.
    pub band: f64,
    pub step_up: f64,
    pub step_down: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub initial_difficulty: f64,
}

impl Default for GovernorTuning {
    fn default() -> Self {
        Self {
            window_ms: 30_000,
            band: 0.10,
            step_up: 1.06,
            step_down: 0.94,
            min_difficulty: 0.40,
            max_difficulty: 4.0,
            initial_difficulty: 1.0,
        }
    }
}

/// Session accounting. Serializable so a host can carry it across restarts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorState {
    pub day_key: NaiveDate,
    pub coins_awarded_today: f64,
    pub daily_cap: f64,
    pub window_awarded: f64,
    pub window_start: Millis,
    pub difficulty_factor: f64,
    pub cap_reached: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorSnapshot {
    pub day: NaiveDate,
    pub difficulty: f64,
    pub cap_reached: bool,
    pub daily_cap: f64,
    pub coins_today: f64,
    pub target_per_min: f64,
}

/// What a closed window observed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSample {
    pub observed_per_min: f64,
    pub difficulty_before: f64,
    pub difficulty_after: f64,
}

#[derive(Clone, Debug)]
pub struct Governor {
    schedule: EmissionSchedule,
    tuning: GovernorTuning,
    st: GovernorState,
}

impl Governor {
    pub fn new(schedule: EmissionSchedule, tuning: GovernorTuning, now: Millis) -> Self {
        let st = GovernorState {
            day_key: day_of(now),
            coins_awarded_today: 0.0,
            daily_cap: schedule.daily_cap,
            window_awarded: 0.0,
            window_start: now,
            difficulty_factor: tuning
                .initial_difficulty
                .clamp(tuning.min_difficulty, tuning.max_difficulty),
            cap_reached: false,
        };
        Self { schedule, tuning, st }
    }

    /// Resume from saved accounting. The cap always comes from `schedule`; a
    /// state from an earlier day rolls over on the first award.
    pub fn restore(
        schedule: EmissionSchedule,
        tuning: GovernorTuning,
        mut st: GovernorState,
    ) -> Self {
        st.difficulty_factor = if st.difficulty_factor.is_finite() {
            st.difficulty_factor.clamp(tuning.min_difficulty, tuning.max_difficulty)
        } else {
            tuning.initial_difficulty
        };
        if st.daily_cap != schedule.daily_cap {
            info!(
                saved = st.daily_cap,
                configured = schedule.daily_cap,
                "daily cap changed since save"
            );
            st.daily_cap = schedule.daily_cap;
            st.cap_reached = units::whole_coins(st.coins_awarded_today) >= st.daily_cap;
        }
        st.coins_awarded_today =
            units::whole_coins(st.coins_awarded_today).min(st.daily_cap.max(0.0));
        st.window_awarded = units::whole_coins(st.window_awarded);
        Self { schedule, tuning, st }
    }

    fn roll_day(&mut self, now: Millis) {
        let today = day_of(now);
        if self.st.day_key != today {
            info!(
                from = %self.st.day_key,
                to = %today,
                awarded = self.st.coins_awarded_today,
                "emission day rolled over"
            );
            self.st.day_key = today;
            self.st.coins_awarded_today = 0.0;
            self.st.daily_cap = self.schedule.daily_cap;
            self.st.cap_reached = false;
        }
    }

    /// Scale `raw` by difficulty, floor to whole coins and clamp to what is
    /// left of today's cap. Never negative. A grant of 0 marks the cap as
    /// reached for the rest of the day.
    pub fn award(&mut self, raw: f64, now: Millis) -> f64 {
        self.roll_day(now);

        let scaled = raw / self.st.difficulty_factor;
        let remaining = (self.st.daily_cap - self.st.coins_awarded_today).max(0.0);
        let add = units::whole_coins(scaled).min(remaining);

        if add <= 0.0 {
            self.st.cap_reached = true;
            return 0.0;
        }

        self.st.coins_awarded_today += add;
        self.st.window_awarded += add;
        if self.st.coins_awarded_today >= self.st.daily_cap && !self.st.cap_reached {
            self.st.cap_reached = true;
            info!(day = %self.st.day_key, cap = self.st.daily_cap, "daily emission cap reached");
        }
        debug!(raw, awarded = add, today = self.st.coins_awarded_today, "governed award");
        add
    }

    /// Close the sampling window if it has run its length. Cheap to call every frame.
    pub fn tick(&mut self, now: Millis) -> Option<WindowSample> {
        let elapsed = now.saturating_sub(self.st.window_start);
        if elapsed < self.tuning.window_ms {
            return None;
        }

        let t = &self.tuning;
        let observed = self.st.window_awarded / units::minutes(elapsed, 1e-6);
        let before = self.st.difficulty_factor;
        let after = control::deadband_step(
            before,
            observed,
            self.schedule.coins_per_user_min,
            t.band,
            t.step_up,
            t.step_down,
            t.min_difficulty,
            t.max_difficulty,
        );
        if after != before {
            debug!(observed_per_min = observed, before, after, "difficulty adjusted");
        }

        self.st.difficulty_factor = after;
        self.st.window_awarded = 0.0;
        self.st.window_start = now;
        Some(WindowSample {
            observed_per_min: observed,
            difficulty_before: before,
            difficulty_after: after,
        })
    }

    /// Flat passive estimate for time away: whole minutes away (capped) times
    /// the target rate, discounted by `efficiency`, floored. Not governed.
    pub fn offline_coins(&self, ms_away: Millis, cap_hours: f64, efficiency: f64) -> f64 {
        let minutes = ((ms_away.max(0) / 60_000) as f64).min(cap_hours * 60.0);
        units::whole_coins(minutes * self.schedule.coins_per_user_min * efficiency)
    }

    pub fn snapshot(&self) -> GovernorSnapshot {
        GovernorSnapshot {
            day: self.st.day_key,
            difficulty: self.st.difficulty_factor,
            cap_reached: self.st.cap_reached,
            daily_cap: self.st.daily_cap,
            coins_today: self.st.coins_awarded_today,
            target_per_min: self.schedule.coins_per_user_min,
        }
    }

    pub fn state(&self) -> &GovernorState {
        &self.st
    }
    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }
    pub fn tuning(&self) -> &GovernorTuning {
        &self.tuning
    }
    pub fn difficulty(&self) -> f64 {
        self.st.difficulty_factor
    }
    pub fn cap_reached(&self) -> bool {
        self.st.cap_reached
    }
    pub fn daily_cap(&self) -> f64 {
        self.st.daily_cap
    }
    pub fn target_per_min(&self) -> f64 {
        self.schedule.coins_per_user_min
    }
}
