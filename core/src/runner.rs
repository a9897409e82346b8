//! The interval runner.
//!
//! # State machine
//!
//! ```text
//!            set_delay(Every)            set_delay(other Every)
//!   Idle ───────────────────────▶ Active ───────────────┐
//!    ▲                              │  ▲  cancel+register│
//!    │ set_delay(Disabled)/teardown │  └─────────────────┘
//!    └──────────────────────────────┘
//! ```
//!
//! The runner holds at most one driver handle. Replacing the action never
//! moves between states.

use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use cadence_types::{Delay, TimerId};
use tracing::{debug, trace};

use crate::action::{Action, LatestActionSlot};
use crate::driver::{Tick, TimerDriver, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No timer registered.
    Idle,
    /// Exactly one timer registered, identified by its driver id.
    Active(TimerId),
}

impl RunnerState {
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerStats {
    /// Timers registered over the runner's lifetime.
    pub registrations: u64,
    /// Timers cancelled over the runner's lifetime.
    pub releases: u64,
    /// Ticks delivered, including ones that found no action.
    pub ticks: u64,
}

/// Keeps the latest action firing every `delay` while the runner lives.
///
/// Dropping the runner (or calling [`teardown`](Self::teardown)) cancels the
/// active timer. No tick is delivered after that.
pub struct IntervalRunner<D: TimerDriver> {
    driver: D,
    slot: Rc<LatestActionSlot>,
    delay: Option<Delay>,
    handle: Option<D::Handle>,
    registrations: u64,
    releases: u64,
}

impl<D: TimerDriver> IntervalRunner<D> {
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            slot: Rc::new(LatestActionSlot::new()),
            delay: None,
            handle: None,
            registrations: 0,
            releases: 0,
        }
    }

    /// Apply `(action, delay)`. Safe to call on every re-evaluation.
    ///
    /// The timer is only touched if `delay` differs from the last applied one.
    pub fn configure(&mut self, action: Action, delay: Delay) {
        self.set_action(action);
        self.set_delay(delay);
    }

    /// Make `action` the one the next tick runs. Never touches the timer.
    pub fn set_action(&mut self, action: Action) {
        if self.slot.replace(action) {
            trace!(state = ?self.state(), "interval action replaced");
        }
    }

    /// Apply `delay`, re-registering the timer if it changed.
    ///
    /// The first call always applies. Any held timer is cancelled before a new
    /// one is registered.
    pub fn set_delay(&mut self, delay: Delay) {
        if self.delay == Some(delay) {
            return;
        }
        let previous = self.delay.replace(delay);

        self.release();
        if let Some(period) = delay.period() {
            self.acquire(period);
        }

        debug!(
            from = ?previous,
            to = %delay,
            state = ?self.state(),
            "interval delay applied"
        );
    }

    /// Tear the runner down, cancelling any active timer.
    ///
    /// Returns the final stats.
    pub fn teardown(mut self) -> RunnerStats {
        self.release();
        self.stats()
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.handle
            .as_ref()
            .map_or(RunnerState::Idle, |handle| RunnerState::Active(handle.id()))
    }

    /// The last applied delay, or `None` before the first configuration.
    #[must_use]
    pub fn delay(&self) -> Option<Delay> {
        self.delay
    }

    #[must_use]
    pub fn stats(&self) -> RunnerStats {
        RunnerStats {
            registrations: self.registrations,
            releases: self.releases,
            ticks: self.slot.ticks(),
        }
    }

    fn acquire(&mut self, period: Duration) {
        debug_assert!(self.handle.is_none(), "acquire with a live handle");

        // Weak: the tick must not keep the slot alive past the runner.
        let slot: Weak<LatestActionSlot> = Rc::downgrade(&self.slot);
        let tick: Tick = Rc::new(move || {
            if let Some(slot) = slot.upgrade() {
                let ran = slot.fire();
                trace!(tick = slot.ticks(), ran, "interval tick");
            }
        });

        let handle = self.driver.register(period, tick);
        self.registrations += 1;
        debug!(
            timer = %handle.id(),
            period_ms = period.as_millis() as u64,
            "interval timer registered"
        );
        self.handle = Some(handle);
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            let id = handle.id();
            self.driver.cancel(handle);
            self.releases += 1;
            debug!(timer = %id, "interval timer released");
        }
    }
}

impl<D: TimerDriver> Drop for IntervalRunner<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: TimerDriver> fmt::Debug for IntervalRunner<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalRunner")
            .field("state", &self.state())
            .field("delay", &self.delay)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
