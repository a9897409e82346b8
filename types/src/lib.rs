//! Core domain types for Cadence.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod delay;
mod ids;

pub use delay::{Delay, DelayError};
pub use ids::TimerId;
