//! Flutter-facing bindings for the chore checklist core.

pub mod api;
