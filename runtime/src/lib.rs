//! Tokio timer driver for Cadence.
//!
//! [`TokioTimer`] runs each registration as a local task on the current
//! [`LocalSet`](tokio::task::LocalSet). Ticks therefore share the host's
//! thread and never run concurrently with configuration calls, which is what
//! lets the runner use `Rc`/`RefCell` state without locks.
//!
//! ```text
//! register(period, tick) -> spawn_local(loop { interval.tick().await; tick() })
//! cancel(handle)         -> abort()
//! ```

use std::time::Duration;

use cadence_core::{Tick, TimerDriver, TimerHandle};
use cadence_types::{Delay, TimerId};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::trace;

/// Timer driver backed by `tokio::time::interval`.
///
/// Must be used from inside a `LocalSet` on a current-thread runtime;
/// registering anywhere else panics, since `spawn_local` needs one.
#[derive(Debug, Default)]
pub struct TokioTimer {
    next_id: TimerId,
}

impl TokioTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A live tokio registration. Dropping it stops the timer.
#[derive(Debug)]
pub struct TokioTimerHandle {
    id: TimerId,
    task: JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn id(&self) -> TimerId {
        self.id
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        // An aborted local task is never polled again, so no tick follows.
        self.task.abort();
    }
}

impl TimerDriver for TokioTimer {
    type Handle = TokioTimerHandle;

    fn register(&mut self, period: Duration, tick: Tick) -> TokioTimerHandle {
        let period = Delay::clamp_period(period);
        let id = self.next_id;
        self.next_id = id.next();

        let task = tokio::task::spawn_local(async move {
            // interval_at: the first tick is one period out, not immediate.
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                tick();
            }
        });
        trace!(
            timer = %id,
            period_ms = period.as_millis() as u64,
            "tokio timer spawned"
        );

        TokioTimerHandle { id, task }
    }

    fn cancel(&mut self, handle: TokioTimerHandle) {
        trace!(timer = %handle.id, "tokio timer aborted");
        drop(handle);
    }
}
