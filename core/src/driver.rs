use std::rc::Rc;
use std::time::Duration;

use cadence_types::TimerId;

/// Callback a driver invokes once per period.
pub type Tick = Rc<dyn Fn()>;

/// A repeating-timer primitive supplied by the host.
///
/// Drivers are single-threaded: ticks are delivered on the same thread that
/// registers and cancels them, never concurrently with either.
pub trait TimerDriver {
    /// Opaque proof of one live registration. Consumed by [`cancel`](Self::cancel).
    type Handle: TimerHandle;

    /// Start calling `tick` every `period`, first one period from now.
    ///
    /// Implementations schedule
    /// [`Delay::clamp_period(period)`](cadence_types::Delay::clamp_period), so
    /// any `Duration` is accepted.
    fn register(&mut self, period: Duration, tick: Tick) -> Self::Handle;

    /// Stop the registration. No tick from `handle` is delivered afterwards.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Anything a driver hands back from `register`.
pub trait TimerHandle {
    fn id(&self) -> TimerId;
}

impl TimerHandle for TimerId {
    fn id(&self) -> TimerId {
        *self
    }
}
