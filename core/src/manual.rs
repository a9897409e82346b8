//! Virtual-time timer driver.
//!
//! Time only moves when [`ManualTimer::advance`] is called, which makes tick
//! delivery fully deterministic. Ticks due at the same instant fire in
//! registration order.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cadence_types::{Delay, TimerId};

use crate::driver::{Tick, TimerDriver};

struct Entry {
    id: TimerId,
    period: Duration,
    next_due: Duration,
    tick: Tick,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_id: TimerId,
    entries: Vec<Entry>,
    registrations: u64,
    cancellations: u64,
}

impl Inner {
    /// Earliest entry due at or before `deadline`, ties broken by id.
    fn next_due(&self, deadline: Duration) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.next_due <= deadline)
            .min_by_key(|(_, entry)| (entry.next_due, entry.id))
            .map(|(index, _)| index)
    }
}

/// Shared handle to a virtual clock and its registered timers.
///
/// Clones share state, so a test can hand one clone to an
/// [`IntervalRunner`](crate::IntervalRunner) and keep another to drive time.
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: Rc<RefCell<Inner>>,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward by `by`, firing every tick that falls due.
    ///
    /// Returns the number of ticks delivered. A tick that cancels another
    /// registration prevents that registration's remaining ticks in this
    /// advance.
    ///
    /// Every due tick is delivered one by one, so the cost is linear in the
    /// number of ticks that fall inside `by`. A live 1ms timer advanced by
    /// `Duration::MAX` will effectively never return; step time in bounded
    /// increments instead. The deadline saturates at `Duration::MAX`.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.inner.borrow().now.saturating_add(by);
        let mut fired = 0;

        loop {
            let tick = {
                let mut inner = self.inner.borrow_mut();
                let Some(index) = inner.next_due(deadline) else {
                    break;
                };
                let due = inner.entries[index].next_due;
                inner.now = due;
                let entry = &mut inner.entries[index];
                entry.next_due = due.saturating_add(entry.period);
                Rc::clone(&entry.tick)
            };
            // Borrow released: the tick may register or cancel timers.
            tick();
            fired += 1;
        }

        self.inner.borrow_mut().now = deadline;
        fired
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of live registrations.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn registrations(&self) -> u64 {
        self.inner.borrow().registrations
    }

    #[must_use]
    pub fn cancellations(&self) -> u64 {
        self.inner.borrow().cancellations
    }

    /// Effective periods of live registrations, oldest first.
    #[must_use]
    pub fn periods(&self) -> Vec<Duration> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.period)
            .collect()
    }
}

impl TimerDriver for ManualTimer {
    type Handle = TimerId;

    fn register(&mut self, period: Duration, tick: Tick) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id = id.next();
        inner.registrations += 1;

        let period = Delay::clamp_period(period);
        let next_due = inner.now.saturating_add(period);
        inner.entries.push(Entry {
            id,
            period,
            next_due,
            tick,
        });
        id
    }

    fn cancel(&mut self, handle: TimerId) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.id != handle);
        if inner.entries.len() < before {
            inner.cancellations += 1;
        }
    }
}
