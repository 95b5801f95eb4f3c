//! Completion store contracts and implementations.
//!
//! # Responsibility
//! - Persist the task-key -> completed mapping with its last-update stamp.
//! - Hide the persisted representation from the session layer.
//!
//! # Invariants
//! - A missing backing store is a first run, never an error.
//! - `save` fully replaces the previous snapshot and stamps it with "now".
//! - A failed or interrupted `save` leaves the previous snapshot readable.
//!
//! # See also
//! - `reconcile` for the cadence rollover applied on top of `load`.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

pub mod json_file;
pub mod memory;

/// Task key -> completed flag.
pub type CompletionMap = BTreeMap<String, bool>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// `None` only when a persisted snapshot carries no stamp.
    pub last_update: Option<NaiveDateTime>,
    pub records: CompletionMap,
}

impl StoreSnapshot {
    /// First-run snapshot stamped at `now`.
    pub fn empty(now: NaiveDateTime) -> Self {
        Self {
            last_update: Some(now),
            records: CompletionMap::new(),
        }
    }
}

/// Persisted-state failures.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Malformed {
        path: PathBuf,
        message: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "checklist state I/O failed at `{}`: {source}", path.display())
            }
            Self::Malformed { path, message } => write!(
                f,
                "checklist state at `{}` is malformed: {message}",
                path.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { .. } => None,
        }
    }
}

/// Storage capability used by the session controller.
pub trait CompletionStore {
    /// Reads the persisted snapshot, or an empty one stamped "now" on first run.
    ///
    /// # Errors
    /// - `StoreError::Io` on read failures other than "not found".
    /// - `StoreError::Malformed` when persisted content cannot be decoded.
    fn load(&self) -> StoreResult<StoreSnapshot>;

    /// Replaces the persisted snapshot with `records` stamped "now".
    ///
    /// # Errors
    /// - `StoreError::Io` when the snapshot cannot be written.
    fn save(&self, records: &CompletionMap) -> StoreResult<()>;
}

impl<S: CompletionStore + ?Sized> CompletionStore for &S {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        (**self).load()
    }

    fn save(&self, records: &CompletionMap) -> StoreResult<()> {
        (**self).save(records)
    }
}

impl<S: CompletionStore + ?Sized> CompletionStore for Arc<S> {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        (**self).load()
    }

    fn save(&self, records: &CompletionMap) -> StoreResult<()> {
        (**self).save(records)
    }
}
