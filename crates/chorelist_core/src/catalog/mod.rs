//! Task catalog loading.
//!
//! # Responsibility
//! - Fetch tabular task data from an external source.
//! - Validate required headers and normalize rows into ordered `Task`s.
//!
//! # Invariants
//! - Source order is preserved.
//! - A malformed value fails its own row closed; it never aborts the load.
//! - Fetch or schema failures degrade to an empty catalog via
//!   `load_catalog_or_empty`.

pub mod loader;
pub mod source;
pub mod table;
