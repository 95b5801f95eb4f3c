//! Checklist domain model.
//!
//! # Responsibility
//! - Define the canonical task and reward shapes used by core logic.
//! - Own the stable on-disk task identity format (`TaskKey`).
//!
//! # Invariants
//! - Task identity is the `(cadence, name)` pair rendered as `<cadence>_<name>`.
//! - A must-do task never contributes to earnings.

pub mod economics;
pub mod task;
