//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cadence_core::Action;

/// Hands out labelled actions and records which label ran on each tick.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh action (new identity on every call) that records `label`.
    pub fn action(&self, label: impl Into<String>) -> Action {
        let log = Rc::clone(&self.0);
        let label = label.into();
        Action::new(move || log.borrow_mut().push(label.clone()))
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

/// Deterministic step sizes for interleaving time with re-configuration.
pub fn step_pattern(len: usize) -> Vec<u64> {
    // Mix of sub-period, exact-period and multi-period steps.
    const STEPS: [u64; 7] = [3, 10, 17, 1, 25, 9, 40];
    STEPS.iter().copied().cycle().take(len).collect()
}
