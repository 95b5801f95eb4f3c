//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one-turn checklist operations to Dart via FRB.
//! - Flatten core view models into plain, FRB-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens a fresh session, so cadence rollover is applied per turn.
//! - Failures are reported in the envelope `message`, never thrown.

use chorelist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_file_session,
    ping as ping_inner, Cadence, ChecklistConfig, ChecklistView, SurpriseEvent, SystemClock,
    TaskView,
};
use log::warn;
use std::sync::{Arc, OnceLock};

static CONFIG: OnceLock<ChecklistConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One checkbox row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    /// Stable task key (`<cadence>_<name>`), passed back to `checklist_toggle`.
    pub key: String,
    pub label: String,
    /// `daily|weekly|monthly`.
    pub cadence: String,
    pub is_must_do: bool,
    pub reward: f64,
    pub checked: bool,
}

/// Celebration to show once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistSurprise {
    /// `paid|daily`.
    pub kind: String,
    pub task_name: String,
}

/// Full render model for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistResponse {
    pub ok: bool,
    pub daily: Vec<ChecklistItem>,
    pub weekly: Vec<ChecklistItem>,
    pub monthly: Vec<ChecklistItem>,
    pub earned_total: f64,
    pub potential_total: f64,
    pub completed_count: u32,
    pub total_count: u32,
    pub progress: f64,
    /// Non-blocking warnings for the user.
    pub notices: Vec<String>,
    pub surprises: Vec<ChecklistSurprise>,
    /// Human-readable outcome for diagnostics.
    pub message: String,
}

/// Returns the current checklist after cadence reconciliation.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never writes state.
#[flutter_rust_bridge::frb(sync)]
pub fn checklist_view() -> ChecklistResponse {
    let session = open_file_session(resolve_config(), Arc::new(SystemClock));
    to_response(&session.view(), Vec::new(), true, "Checklist loaded.")
}

/// Sets one task's completion flag and persists it immediately.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Unknown keys return `ok=false` with the unchanged checklist.
/// - Surprises raised by this call are returned once in `surprises`.
#[flutter_rust_bridge::frb(sync)]
pub fn checklist_toggle(task_key: String, checked: bool) -> ChecklistResponse {
    let mut session = open_file_session(resolve_config(), Arc::new(SystemClock));
    match session.toggle(task_key.as_str(), checked) {
        Ok(_) => {
            let surprises = session.take_surprises();
            to_response(&session.view(), surprises, true, "Task updated.")
        }
        Err(err) => {
            warn!("event=ffi_toggle module=ffi status=error error_code=unknown_task");
            to_response(
                &session.view(),
                Vec::new(),
                false,
                format!("checklist_toggle failed: {err}"),
            )
        }
    }
}

/// Clears every completion flag and persists the empty state.
#[flutter_rust_bridge::frb(sync)]
pub fn checklist_reset() -> ChecklistResponse {
    let mut session = open_file_session(resolve_config(), Arc::new(SystemClock));
    session.reset_all();
    to_response(&session.view(), Vec::new(), true, "Checklist reset.")
}

fn resolve_config() -> &'static ChecklistConfig {
    CONFIG.get_or_init(ChecklistConfig::from_env)
}

fn to_response(
    view: &ChecklistView,
    surprises: Vec<SurpriseEvent>,
    ok: bool,
    message: impl Into<String>,
) -> ChecklistResponse {
    let items = |cadence: Cadence| -> Vec<ChecklistItem> {
        view.group(cadence)
            .map(|group| group.tasks.iter().map(to_item).collect())
            .unwrap_or_default()
    };

    ChecklistResponse {
        ok,
        daily: items(Cadence::Daily),
        weekly: items(Cadence::Weekly),
        monthly: items(Cadence::Monthly),
        earned_total: view.earned_total.as_f64(),
        potential_total: view.potential_total.as_f64(),
        completed_count: saturating_u32(view.completed_count),
        total_count: saturating_u32(view.total_count),
        progress: view.progress_ratio(),
        notices: view
            .notices
            .iter()
            .map(|notice| notice.message.clone())
            .collect(),
        surprises: surprises.iter().map(to_surprise).collect(),
        message: message.into(),
    }
}

fn to_item(task: &TaskView) -> ChecklistItem {
    ChecklistItem {
        key: task.key.clone(),
        label: task.label.clone(),
        cadence: task.cadence.as_str().to_string(),
        is_must_do: task.economics.is_must_do,
        reward: task.economics.reward.as_f64(),
        checked: task.checked,
    }
}

fn to_surprise(event: &SurpriseEvent) -> ChecklistSurprise {
    let kind = match event {
        SurpriseEvent::PaidTask(_) => "paid",
        SurpriseEvent::DailyTask(_) => "daily",
    };
    ChecklistSurprise {
        kind: kind.to_string(),
        task_name: event.task_name().to_string(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
