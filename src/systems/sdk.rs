// src/systems/sdk.rs

//! # Systems SDK
//!
//! Shared protocol for the systems in this crate (stage table, accrual,
//! emission governor, offline simulation, calibration).
//!
//! ## Time
//! Systems never read a clock on their own. Every time-dependent operation
//! takes a `Millis` timestamp (Unix milliseconds, UTC) supplied by the caller,
//! so tests drive time explicitly and a rendering loop is never required.
//! Orchestrators (genres) own a [`Clock`] and stamp calls with `now_ms()`.
//!
//! - [`SystemClock`]: wall clock via `chrono::Utc::now()`.
//! - [`ManualClock`]: shared, settable clock. Clones observe the same time, so
//!   a test can keep one handle and hand another to a session.
//!
//! The accounting day is the UTC calendar date of a timestamp
//! ([`day_of`]).
//!
//! ## Outcome
//! Closed-loop previews (see `calibration`) return a standard
//! `Outcome<TParams, Obs>` (θ, π, iters, converged).
//!
//! ## Determinism
//! Given the same timestamps and inputs every system produces the same
//! results. If you add RNG, inject seeds explicitly.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};

/// Unix time in milliseconds (UTC).
pub type Millis = i64;

pub const MS_PER_SEC: Millis = 1_000;

/// Time source for orchestrators.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        Utc::now().timestamp_millis()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn at(now: Millis) -> Self {
        Self { now: Rc::new(Cell::new(now)) }
    }
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}

/// UTC calendar date containing `ms`. Out-of-range timestamps map to the epoch day.
pub fn day_of(ms: Millis) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Generic result of a closed-loop run.
#[derive(Clone, Debug)]
pub struct Outcome<TParams, Obs> {
    pub theta: TParams,
    pub obs: Obs,
    pub iters: usize,
    pub converged: bool,
}
