//! Core logic for the chore checklist.
//! This crate is the single source of truth for business invariants: reward
//! parsing, catalog loading, completion persistence and cadence rollover.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod reward;
pub mod service;
pub mod store;

pub use catalog::loader::{
    load_catalog, load_catalog_or_empty, CatalogError, CatalogLoad, CatalogWarning,
};
pub use catalog::source::{CatalogSource, CsvFileSource, StaticCatalogSource};
pub use catalog::table::CatalogTable;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ChecklistConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::economics::{RewardAmount, TaskEconomics};
pub use model::task::{Cadence, Task, TaskKey};
pub use reconcile::{reconcile, rollover, Rollover};
pub use reward::{parse_reward, parse_reward_or_inert, RewardParseError};
pub use service::checklist_service::{
    open_file_session, ChecklistSession, ChecklistView, Notice, NoticeSource, SessionError,
    SessionState, SurpriseEvent, TaskGroup, TaskView,
};
pub use store::json_file::JsonFileCompletionStore;
pub use store::memory::InMemoryCompletionStore;
pub use store::{CompletionMap, CompletionStore, StoreError, StoreResult, StoreSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
