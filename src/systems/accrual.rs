//! Accrual state: one reward-granting event at a time, each worth the
//! multiplier-compounded value built up by the events before it.
//!
//! The engine keeps state in memory and writes it through to a [`Store`]
//! after every mutation. Store failures are logged and otherwise ignored; a
//! failed or corrupt read starts from defaults.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::mechanics::units::round6;
use crate::store::{Store, load_json, save_json};
use crate::systems::stage_table::StageTable;

pub const STORE_KEY: &str = "MLEO_ENGINE_V1";

/// Persisted accrual record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccrualState {
    pub break_count: u64,
    /// Mirror of `stage_for(break_count)`; rewritten on every load and grant.
    pub current_stage: u32,
    pub current_per_break_value: f64,
    pub balance: f64,
}

impl Default for AccrualState {
    fn default() -> Self {
        Self { break_count: 0, current_stage: 1, current_per_break_value: 0.0, balance: 0.0 }
    }
}

impl AccrualState {
    pub fn fresh(table: &StageTable) -> Self {
        Self { current_per_break_value: table.base_value(), ..Self::default() }
    }

    /// Repairs a record read from storage against the active table.
    fn normalized(mut self, table: &StageTable) -> Self {
        self.current_stage = table.stage_for(self.break_count);
        if !(self.current_per_break_value.is_finite() && self.current_per_break_value > 0.0) {
            self.current_per_break_value = table.base_value();
        }
        if !(self.balance.is_finite() && self.balance >= 0.0) {
            self.balance = 0.0;
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualSnapshot {
    pub break_count: u64,
    pub current_stage: u32,
    pub current_per_break_value: f64,
    pub balance: f64,
    pub active_multiplier: f64,
}

pub struct AccrualEngine<S: Store> {
    table: StageTable,
    state: AccrualState,
    store: S,
    key: String,
}

impl<S: Store> AccrualEngine<S> {
    /// Open under the default key and run [`initialize`](Self::initialize).
    pub fn open(store: S, table: Option<StageTable>) -> Self {
        Self::open_with_key(store, STORE_KEY, table)
    }

    pub fn open_with_key(store: S, key: &str, table: Option<StageTable>) -> Self {
        let table = table.unwrap_or_default();
        let state = AccrualState::fresh(&table);
        let mut engine = Self { table, state, store, key: key.to_string() };
        engine.initialize(None);
        engine
    }

    /// Load prior state (or create and save defaults), optionally swapping
    /// the stage table first.
    pub fn initialize(&mut self, table: Option<StageTable>) -> AccrualSnapshot {
        if let Some(t) = table {
            self.table = t;
        }
        match load_json::<AccrualState>(&self.store, &self.key) {
            Ok(Some(s)) => self.state = s.normalized(&self.table),
            Ok(None) => {
                self.state = AccrualState::fresh(&self.table);
                self.persist();
            }
            Err(e) => {
                warn!(
                    error = %e,
                    key = %self.key,
                    "accrual state unreadable; starting from defaults"
                );
                self.state = AccrualState::fresh(&self.table);
            }
        }
        self.snapshot()
    }

    /// Record one event. Returns the raw (pre-governor) reward for it.
    pub fn grant_event(&mut self) -> f64 {
        let s = &mut self.state;
        let stage = self.table.stage_for(s.break_count);
        let r = self.table.lookup(stage);

        let awarded = s.current_per_break_value;
        s.current_per_break_value *= r;
        s.break_count += 1;
        s.current_stage = self.table.stage_for(s.break_count);
        s.balance = round6(s.balance + awarded);

        debug!(stage, multiplier = r, awarded, balance = s.balance, "accrual event granted");
        self.persist();
        awarded
    }

    pub fn snapshot(&self) -> AccrualSnapshot {
        let s = &self.state;
        let stage = self.table.stage_for(s.break_count);
        AccrualSnapshot {
            break_count: s.break_count,
            current_stage: stage,
            current_per_break_value: s.current_per_break_value,
            balance: s.balance,
            active_multiplier: self.table.lookup(stage),
        }
    }

    /// Hot-swap the stage table from its JSON form. Returns `false` and keeps
    /// the current table when the document is rejected.
    pub fn set_config(&mut self, raw: &str) -> bool {
        match self.try_set_config(raw) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "stage table rejected; keeping current table");
                false
            }
        }
    }

    pub fn try_set_config(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.set_table(StageTable::from_json(raw)?);
        Ok(())
    }

    /// Swap the table and re-derive the stage from `break_count` under it.
    pub fn set_table(&mut self, table: StageTable) {
        self.table = table;
        let stage = self.table.stage_for(self.state.break_count);
        if stage != self.state.current_stage {
            debug!(from = self.state.current_stage, to = stage, "stage re-derived for new table");
            self.state.current_stage = stage;
            self.persist();
        }
    }

    /// Restore the default record and save it.
    pub fn reset(&mut self) -> AccrualSnapshot {
        self.state = AccrualState::fresh(&self.table);
        self.persist();
        self.snapshot()
    }

    pub fn table(&self) -> &StageTable {
        &self.table
    }
    pub fn state(&self) -> &AccrualState {
        &self.state
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Explicit save for callers that want the error.
    pub fn save(&mut self) -> Result<(), crate::error::StoreError> {
        save_json(&mut self.store, &self.key, &self.state)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, key = %self.key, "accrual state not persisted");
        }
    }
}
