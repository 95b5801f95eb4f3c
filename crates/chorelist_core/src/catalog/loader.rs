//! Catalog validation and normalization.
//!
//! # Responsibility
//! - Check that a raw table carries the `Task`, `Cadence` and `Value` columns.
//! - Build ordered `Task` records, parsing each value with the reward parser.
//!
//! # Invariants
//! - Row-level value errors never fail the load; the row keeps inert
//!   economics and a warning is recorded.
//! - Tasks with unknown cadences are kept but appear in no cadence group.

use crate::catalog::source::CatalogSource;
use crate::catalog::table::CatalogTable;
use crate::model::economics::TaskEconomics;
use crate::model::task::{Cadence, Task, TaskKey};
use crate::reward::{parse_reward, RewardParseError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TASK_COLUMN: &str = "Task";
pub const CADENCE_COLUMN: &str = "Cadence";
pub const VALUE_COLUMN: &str = "Value";

/// Required headers, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 3] = [TASK_COLUMN, CADENCE_COLUMN, VALUE_COLUMN];

// Schema diagnostics only echo this many found headers.
const MAX_REPORTED_HEADERS: usize = 5;

/// Whole-catalog failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Required headers are missing.
    Schema {
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// The source could not be read.
    Fetch { source_name: String, message: String },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema { expected, found } => write!(
                f,
                "task list does not look like the expected sheet: expected columns {expected:?}, found {found:?}"
            ),
            Self::Fetch {
                source_name,
                message,
            } => write!(f, "failed to fetch task list from `{source_name}`: {message}"),
        }
    }
}

impl Error for CatalogError {}

/// Non-fatal catalog problems surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// One row's value could not be parsed; its reward was zeroed.
    InvalidValue {
        row: usize,
        task: String,
        error: RewardParseError,
    },
    /// The whole catalog was replaced by an empty one.
    Unavailable(CatalogError),
}

impl Display for CatalogWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { row, task, error } => {
                write!(f, "row {row} (`{task}`): {error}; reward set to 0")
            }
            Self::Unavailable(err) => write!(f, "{err}"),
        }
    }
}

/// Loaded catalog plus any row-level warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLoad {
    pub tasks: Vec<Task>,
    pub warnings: Vec<CatalogWarning>,
}

impl CatalogLoad {
    /// Empty catalog carrying the reason it is empty.
    pub fn unavailable(err: CatalogError) -> Self {
        Self {
            tasks: Vec::new(),
            warnings: vec![CatalogWarning::Unavailable(err)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks of one cadence group, in source order.
    pub fn tasks_for(&self, cadence: Cadence) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |task| task.cadence == Some(cadence))
    }

    /// Finds the task addressed by `key`.
    pub fn find(&self, key: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|task| task.key().as_ref().map(TaskKey::as_str) == Some(key))
    }
}

/// Validates and normalizes a raw table.
///
/// # Errors
/// - `CatalogError::Schema` when any required header is missing.
pub fn load_catalog(table: &CatalogTable) -> Result<CatalogLoad, CatalogError> {
    let (task_idx, cadence_idx, value_idx) = match (
        table.column(TASK_COLUMN),
        table.column(CADENCE_COLUMN),
        table.column(VALUE_COLUMN),
    ) {
        (Some(task), Some(cadence), Some(value)) => (task, cadence, value),
        _ => {
            return Err(CatalogError::Schema {
                expected: REQUIRED_COLUMNS.iter().map(|name| name.to_string()).collect(),
                found: table
                    .headers
                    .iter()
                    .take(MAX_REPORTED_HEADERS)
                    .cloned()
                    .collect(),
            });
        }
    };

    let mut load = CatalogLoad::default();
    for (index, row) in table.rows.iter().enumerate() {
        let cell = move |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let name = cell(task_idx);
        let raw_value = cell(value_idx);

        let economics = match parse_reward(raw_value) {
            Ok(economics) => economics,
            Err(error) => {
                warn!(
                    "event=catalog_row module=catalog status=error row={} error_code=invalid_value",
                    index + 1
                );
                load.warnings.push(CatalogWarning::InvalidValue {
                    row: index + 1,
                    task: name.to_string(),
                    error,
                });
                TaskEconomics::inert()
            }
        };

        load.tasks
            .push(Task::new(name, cell(cadence_idx), raw_value, economics));
    }

    let unrecognized = load.tasks.iter().filter(|task| task.cadence.is_none()).count();
    info!(
        "event=catalog_load module=catalog status=ok tasks={} invalid_values={} unrecognized_cadence={}",
        load.tasks.len(),
        load.warnings.len(),
        unrecognized
    );
    Ok(load)
}

/// Fetches and loads a catalog, degrading every failure to an empty catalog.
pub fn load_catalog_or_empty(source: &dyn CatalogSource) -> CatalogLoad {
    let result = source.fetch().and_then(|table| load_catalog(&table));
    match result {
        Ok(load) => load,
        Err(err) => {
            warn!(
                "event=catalog_load module=catalog status=error fallback=empty error={}",
                err
            );
            CatalogLoad::unavailable(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load_catalog, CatalogError};
    use crate::catalog::table::CatalogTable;

    #[test]
    fn schema_error_reports_at_most_five_found_headers() {
        let table = CatalogTable::from_rows(&["a", "b", "c", "d", "e", "f", "g"], &[]);
        let err = load_catalog(&table).expect_err("missing columns must fail");
        match err {
            CatalogError::Schema { expected, found } => {
                assert_eq!(expected, vec!["Task", "Cadence", "Value"]);
                assert_eq!(found, vec!["a", "b", "c", "d", "e"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let table = CatalogTable::from_rows(&["Task", "Cadence", "Value"], &[&["Read book"]]);
        let load = load_catalog(&table).expect("load should succeed");
        assert_eq!(load.tasks.len(), 1);
        assert_eq!(load.tasks[0].name, "Read book");
        assert_eq!(load.tasks[0].cadence, None);
        assert!(!load.tasks[0].economics.is_must_do);
    }
}
