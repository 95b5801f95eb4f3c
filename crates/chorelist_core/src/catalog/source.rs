//! Catalog source seam.
//!
//! The task list normally comes from a spreadsheet export. Sources only hand
//! back raw tables; validation stays in the loader.

use crate::catalog::loader::CatalogError;
use crate::catalog::table::CatalogTable;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

/// Read-only provider of the raw task table.
pub trait CatalogSource {
    /// Short description used in diagnostics (never task content).
    fn describe(&self) -> String;

    /// Fetches the current table.
    ///
    /// # Errors
    /// - `CatalogError::Fetch` when the source is unreachable or unreadable.
    fn fetch(&self) -> Result<CatalogTable, CatalogError>;
}

/// CSV export stored on local disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<CatalogTable, CatalogError> {
        let started_at = Instant::now();
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let table = CatalogTable::parse_csv(text.as_str());
                info!(
                    "event=catalog_fetch module=catalog status=ok source=csv rows={} duration_ms={}",
                    table.rows.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(table)
            }
            Err(err) => {
                error!(
                    "event=catalog_fetch module=catalog status=error source=csv duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(CatalogError::Fetch {
                    source_name: self.describe(),
                    message: err.to_string(),
                })
            }
        }
    }
}

/// In-memory table, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    table: CatalogTable,
}

impl StaticCatalogSource {
    pub fn new(table: CatalogTable) -> Self {
        Self { table }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    fn fetch(&self) -> Result<CatalogTable, CatalogError> {
        Ok(self.table.clone())
    }
}
