//! JSON state file store.
//!
//! # Responsibility
//! - Read and write `{ "last_update": ..., "task_states": { ... } }`.
//! - Replace the file atomically (temp file in the same directory, fsync,
//!   rename).
//!
//! # Invariants
//! - `last_update` is written as a local ISO-8601 timestamp without offset.
//! - Task keys are written verbatim; their format is owned by `TaskKey`.

use crate::clock::Clock;
use crate::store::{CompletionMap, CompletionStore, StoreError, StoreResult, StoreSnapshot};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    task_states: CompletionMap,
}

/// Completion store backed by one JSON file.
pub struct JsonFileCompletionStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileCompletionStore {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<StoreSnapshot> {
        let state: PersistedState =
            serde_json::from_slice(bytes).map_err(|err| self.malformed(err.to_string()))?;
        let last_update = match state.last_update.as_deref() {
            Some(raw) => Some(
                parse_timestamp(raw)
                    .ok_or_else(|| self.malformed(format!("invalid last_update `{raw}`")))?,
            ),
            None => None,
        };

        Ok(StoreSnapshot {
            last_update,
            records: state.task_states,
        })
    }

    fn write_atomic(&self, bytes: &[u8]) -> StoreResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|err| self.io_error(err))?;
        tmp.write_all(bytes).map_err(|err| self.io_error(err))?;
        tmp.as_file().sync_all().map_err(|err| self.io_error(err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }
}

impl CompletionStore for JsonFileCompletionStore {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        let started_at = Instant::now();
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("event=store_load module=store status=ok first_run=true");
                return Ok(StoreSnapshot::empty(self.clock.now()));
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=read_failed error={}",
                    err
                );
                return Err(self.io_error(err));
            }
        };

        match self.decode(&bytes) {
            Ok(snapshot) => {
                info!(
                    "event=store_load module=store status=ok records={} duration_ms={}",
                    snapshot.records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(snapshot)
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=malformed error={}",
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, records: &CompletionMap) -> StoreResult<()> {
        let started_at = Instant::now();
        let state = PersistedState {
            last_update: Some(format_timestamp(self.clock.now())),
            task_states: records.clone(),
        };
        let bytes =
            serde_json::to_vec_pretty(&state).map_err(|err| self.malformed(err.to_string()))?;

        match self.write_atomic(&bytes) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok records={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error error_code=write_failed error={}",
                    err
                );
                Err(err)
            }
        }
    }
}

/// Formats a local timestamp the way state files store it.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Accepts naive local timestamps (with or without fractional seconds),
/// RFC 3339 timestamps with an offset (converted to local wall-clock time)
/// and bare dates (read as local midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(value);
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(value);
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDate;

    #[test]
    fn timestamp_formats_with_microseconds() {
        let value = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|date| date.and_hms_micro_opt(9, 30, 5, 42))
            .expect("valid timestamp");
        assert_eq!(format_timestamp(value), "2024-01-02T09:30:05.000042");
        assert_eq!(parse_timestamp("2024-01-02T09:30:05.000042"), Some(value));
    }

    #[test]
    fn parse_accepts_whole_seconds_and_bare_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 30)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        assert_eq!(parse_timestamp("2024-12-30T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-30"), Some(expected));
    }

    #[test]
    fn parse_accepts_offset_timestamps() {
        assert!(parse_timestamp("2024-06-01T12:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-06-01T12:00:00Z").is_some());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
