// src/genres/idle.rs

//! Idle session orchestrator.
//!
//! Composes the neutral systems into one play session:
//! - accrual              → raw reward per gameplay event
//! - emission_governor    → daily cap + difficulty on everything credited
//! - offline_simulation   → lump-sum catch-up on resume
//!
//! Coins reach the wallet only through the governor. Offline catch-up is
//! parked in `pending_offline` until the player collects it.
//!
//! The session owns a [`Store`] and a [`Clock`]. It writes its record and the
//! governor's accounting through the store after every state change; failures
//! are logged and play continues on in-memory state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::store::{Store, load_json, save_json};
use crate::systems::accrual::{AccrualEngine, AccrualSnapshot};
use crate::systems::emission_governor::{Governor, GovernorSnapshot, GovernorState, WindowSample};
use crate::systems::offline_simulation::{OfflineSimulator, ProductionLine};
use crate::systems::sdk::{Clock, MS_PER_SEC, Millis};

pub const SESSION_KEY: &str = "mleo_mining_rush_v1";
pub const GOVERNOR_KEY: &str = "mleo_mining_rush_v1_governor";

/// Persisted session record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub wallet: f64,
    pub pending_offline: f64,
    /// `None` until the first suspend/resume stamps it.
    pub last_seen: Option<Millis>,
}

/// Result of one gameplay event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grant {
    pub raw: f64,
    pub awarded: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub wallet: f64,
    pub pending_offline: f64,
    pub accrual: AccrualSnapshot,
    pub governor: GovernorSnapshot,
}

pub struct IdleSession<S: Store, C: Clock> {
    accrual: AccrualEngine<S>,
    governor: Governor,
    offline: OfflineSimulator,
    clock: C,
    rec: SessionRecord,
}

impl<S: Store, C: Clock> IdleSession<S, C> {
    /// Load (or create) the session, its accrual record and governor
    /// accounting from `store`.
    pub fn open(store: S, clock: C, cfg: EngineConfig) -> Self {
        let now = clock.now_ms();
        let accrual = AccrualEngine::open(store, Some(cfg.stage_table.clone()));
        let schedule = cfg.emission.schedule();

        let governor = match load_json::<GovernorState>(accrual.store(), GOVERNOR_KEY) {
            Ok(Some(st)) => Governor::restore(schedule, cfg.tuning, st),
            Ok(None) => Governor::new(schedule, cfg.tuning, now),
            Err(e) => {
                warn!(error = %e, "governor state unreadable; starting a fresh day");
                Governor::new(schedule, cfg.tuning, now)
            }
        };
        let rec = match load_json::<SessionRecord>(accrual.store(), SESSION_KEY) {
            Ok(r) => r.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "session record unreadable; starting empty");
                SessionRecord::default()
            }
        };

        info!(wallet = rec.wallet, daily_cap = governor.daily_cap(), "idle session opened");
        Self { accrual, governor, offline: OfflineSimulator::new(cfg.offline), clock, rec }
    }

    /// One reward-granting gameplay event (e.g. a rock broken).
    pub fn on_event(&mut self) -> Grant {
        let now = self.clock.now_ms();
        let raw = self.accrual.grant_event();
        let awarded = self.governor.award(raw, now);
        self.rec.wallet += awarded;
        self.persist();
        Grant { raw, awarded }
    }

    /// Governed award for rewards that do not come from the accrual curve
    /// (gifts, bonuses). Returns the amount credited.
    pub fn award_bonus(&mut self, raw: f64) -> f64 {
        let now = self.clock.now_ms();
        let awarded = self.governor.award(raw, now);
        if awarded > 0.0 {
            self.rec.wallet += awarded;
            self.persist();
        }
        awarded
    }

    /// Drive the governor's sampling window. Call every frame or on a timer.
    pub fn tick(&mut self) -> Option<WindowSample> {
        let now = self.clock.now_ms();
        let sample = self.governor.tick(now);
        if sample.is_some() {
            self.persist();
        }
        sample
    }

    /// The game is going to the background.
    pub fn suspend(&mut self) {
        self.rec.last_seen = Some(self.clock.now_ms());
        self.persist();
    }

    /// The game is back. Replays the time away across `lines` and parks the
    /// governed result in `pending_offline`. Returns the amount parked.
    pub fn resume(&mut self, lines: &mut [ProductionLine]) -> f64 {
        let now = self.clock.now_ms();
        let mut add = 0.0;
        if let Some(seen) = self.rec.last_seen {
            let elapsed = now.saturating_sub(seen).max(0) as f64 / MS_PER_SEC as f64;
            if elapsed > self.offline.policy.resume_threshold_secs {
                let raw = self.offline.simulate(elapsed, lines);
                add = self.governor.award(self.offline.discounted(raw), now);
                self.rec.pending_offline += add;
                debug!(elapsed, raw, awarded = add, "offline catch-up parked");
            }
        }
        self.rec.last_seen = Some(now);
        self.persist();
        add
    }

    /// Move parked offline coins into the wallet. Returns the amount moved.
    pub fn collect_offline(&mut self) -> f64 {
        let add = self.rec.pending_offline;
        if add > 0.0 {
            self.rec.wallet += add;
            self.rec.pending_offline = 0.0;
            self.persist();
        }
        add
    }

    /// Passive estimate for `ms_away` (no production lines needed).
    pub fn offline_estimate(&self, ms_away: Millis) -> f64 {
        let p = &self.offline.policy;
        self.governor.offline_coins(ms_away, p.cap_hours, p.efficiency)
    }

    pub fn wallet(&self) -> f64 {
        self.rec.wallet
    }
    pub fn pending_offline(&self) -> f64 {
        self.rec.pending_offline
    }
    pub fn accrual(&self) -> &AccrualEngine<S> {
        &self.accrual
    }
    pub fn accrual_mut(&mut self) -> &mut AccrualEngine<S> {
        &mut self.accrual
    }
    pub fn governor(&self) -> &Governor {
        &self.governor
    }
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            wallet: self.rec.wallet,
            pending_offline: self.rec.pending_offline,
            accrual: self.accrual.snapshot(),
            governor: self.governor.snapshot(),
        }
    }

    /// Write the session record and governor accounting, reporting the first failure.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let store = self.accrual.store_mut();
        save_json(store, SESSION_KEY, &self.rec)?;
        save_json(store, GOVERNOR_KEY, self.governor.state())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "session not persisted");
        }
    }
}
