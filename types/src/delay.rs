//! Repeating-timer delay.
//!
//! A [`Delay`] is either a period or the `Disabled` sentinel. Raw millisecond
//! values coming from config or other untyped sources go through
//! [`Delay::from_millis`], which is the only place a delay can be rejected.
//! The typed constructors saturate instead, and drivers pass every period
//! through [`Delay::clamp_period`], so no `Delay` can make a driver fail.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DelayError {
    #[error("delay must not be negative (got {0}ms)")]
    Negative(f64),
    #[error("delay must be a finite number of milliseconds (got {0})")]
    NotFinite(f64),
    #[error("delay of {0}ms exceeds the maximum of {max}ms", max = Delay::MAX_MILLIS)]
    TooLarge(f64),
}

/// How often a repeating timer fires, or `Disabled` for no timer at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Delay {
    /// No timer is registered.
    #[default]
    Disabled,
    /// Fire once every period.
    Every(Duration),
}

impl Delay {
    /// Shortest period a driver will actually schedule.
    ///
    /// A zero delay is legal and means "as often as possible"; drivers clamp it
    /// to this value instead of spinning.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// Longest period a driver will actually schedule (`i32::MAX` ms, ~24.8 days).
    pub const MAX_PERIOD: Duration = Duration::from_millis(2_147_483_647);

    /// Largest accepted raw delay, in milliseconds. Matches [`Delay::MAX_PERIOD`].
    pub const MAX_MILLIS: f64 = 2_147_483_647.0;

    /// Fire every `period`, saturating at [`Delay::MAX_PERIOD`].
    #[must_use]
    pub fn every(period: Duration) -> Self {
        Self::Every(period.min(Self::MAX_PERIOD))
    }

    /// Fire every `ms` milliseconds, saturating at [`Delay::MAX_PERIOD`].
    #[must_use]
    pub fn millis(ms: u64) -> Self {
        Self::every(Duration::from_millis(ms))
    }

    /// Parse a raw, possibly absent, millisecond value.
    ///
    /// `None` is the disabled sentinel. Negative, NaN, infinite, and values
    /// above [`Delay::MAX_MILLIS`] are rejected.
    pub fn from_millis(raw: Option<f64>) -> Result<Self, DelayError> {
        let Some(ms) = raw else {
            return Ok(Self::Disabled);
        };
        if !ms.is_finite() {
            return Err(DelayError::NotFinite(ms));
        }
        if ms < 0.0 {
            return Err(DelayError::Negative(ms));
        }
        if ms > Self::MAX_MILLIS {
            return Err(DelayError::TooLarge(ms));
        }
        let nanos = (ms * 1_000_000.0).round() as u64;
        Ok(Self::Every(Duration::from_nanos(nanos)))
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// The requested period, exactly as given.
    #[must_use]
    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Every(period) => Some(period),
        }
    }

    /// The period a driver schedules for a requested one.
    ///
    /// Holds even for a hand-built `Delay::Every(Duration::MAX)`.
    #[must_use]
    pub fn clamp_period(period: Duration) -> Duration {
        period.clamp(Self::MIN_PERIOD, Self::MAX_PERIOD)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Every(period) => write!(f, "every {}ms", period.as_millis()),
        }
    }
}
