//! Declarative repeating intervals.
//!
//! An [`IntervalRunner`] keeps an action firing every `delay` for as long as
//! the runner lives. Callers re-apply `(action, delay)` whenever either may
//! have changed; the runner only touches the timer when the delay changes,
//! and every tick runs whatever action was applied last.
//!
//! ```text
//! configure(action, delay)
//!     |-- action differs?  -> LatestActionSlot
//!     `-- delay differs?   -> cancel(old handle), register(tick, period)
//!
//! tick -> LatestActionSlot -> action()
//! ```
//!
//! The timer itself comes from a [`TimerDriver`]. [`ManualTimer`] is a
//! virtual-time driver for tests and hosts that own their clock; the
//! `cadence-runtime` crate provides one backed by tokio.

mod action;
mod driver;
mod manual;
mod runner;

pub use action::{Action, LatestActionSlot};
pub use driver::{Tick, TimerDriver, TimerHandle};
pub use manual::ManualTimer;
pub use runner::{IntervalRunner, RunnerState, RunnerStats};

pub use cadence_types::{Delay, DelayError, TimerId};
