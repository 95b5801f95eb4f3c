//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate catalog, completion store and reconciliation per turn.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod checklist_service;
