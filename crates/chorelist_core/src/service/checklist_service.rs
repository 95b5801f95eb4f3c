//! Checklist session controller.
//!
//! # Responsibility
//! - Combine the catalog with reconciled completion state for one user.
//! - Apply checkbox toggles, raise surprise events and write through to the
//!   completion store.
//! - Aggregate earned/potential rewards and progress for front ends.
//!
//! # Invariants
//! - Every completion change is persisted before the call returns.
//! - Store and catalog failures become notices, never errors.
//! - Must-do tasks never add to `earned_total`.
//! - Each surprise event is handed out at most once.

use crate::catalog::loader::{load_catalog_or_empty, CatalogLoad};
use crate::catalog::source::CsvFileSource;
use crate::clock::Clock;
use crate::config::ChecklistConfig;
use crate::model::economics::{RewardAmount, TaskEconomics};
use crate::model::task::{Cadence, Task};
use crate::reconcile::reconcile;
use crate::store::json_file::JsonFileCompletionStore;
use crate::store::{CompletionMap, CompletionStore, StoreSnapshot};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// One-shot celebration raised by a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurpriseEvent {
    /// A task that is not must-do was just completed.
    PaidTask(String),
    /// A daily must-do task was just completed.
    DailyTask(String),
}

impl SurpriseEvent {
    pub fn task_name(&self) -> &str {
        match self {
            Self::PaidTask(name) | Self::DailyTask(name) => name.as_str(),
        }
    }
}

/// Subsystem a notice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSource {
    Catalog,
    Store,
}

/// Non-blocking warning shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub source: NoticeSource,
    pub message: String,
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Key does not address any task in a cadence group.
    UnknownTask(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTask(key) => write!(f, "task not found in checklist: {key}"),
        }
    }
}

impl Error for SessionError {}

/// Mutable per-user state carried between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub completion: CompletionMap,
    /// Reference time for rollover: the last reconciliation or successful write.
    pub last_update: Option<NaiveDateTime>,
    pending_paid: Option<SurpriseEvent>,
    pending_daily: Option<SurpriseEvent>,
}

impl SessionState {
    /// Keys never seen before read as not completed.
    pub fn is_checked(&self, key: &str) -> bool {
        self.completion.get(key).copied().unwrap_or(false)
    }

    fn record_surprise(&mut self, event: SurpriseEvent) {
        match event {
            SurpriseEvent::PaidTask(_) => self.pending_paid = Some(event),
            SurpriseEvent::DailyTask(_) => self.pending_daily = Some(event),
        }
    }
}

/// Render-ready task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub key: String,
    pub name: String,
    pub label: String,
    pub cadence: Cadence,
    pub economics: TaskEconomics,
    pub checked: bool,
}

/// Tasks of one cadence, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub cadence: Cadence,
    pub tasks: Vec<TaskView>,
}

/// Everything a front end needs to draw one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistView {
    pub groups: Vec<TaskGroup>,
    pub earned_total: RewardAmount,
    pub potential_total: RewardAmount,
    pub completed_count: usize,
    pub total_count: usize,
    pub notices: Vec<Notice>,
}

impl ChecklistView {
    /// Completed fraction in `0.0..=1.0`; zero for an empty catalog.
    pub fn progress_ratio(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.completed_count as f64 / self.total_count as f64
        }
    }

    pub fn group(&self, cadence: Cadence) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.cadence == cadence)
    }
}

/// Session controller over one catalog and one completion store.
pub struct ChecklistSession<S: CompletionStore> {
    catalog: CatalogLoad,
    store: S,
    clock: Arc<dyn Clock>,
    state: SessionState,
    notices: Vec<Notice>,
}

impl<S: CompletionStore> ChecklistSession<S> {
    /// Opens a session: loads persisted state and reconciles it with "now".
    ///
    /// Unreadable state starts from an empty mapping with a store notice.
    /// Reconciliation does not write; the next change persists it.
    pub fn open(catalog: CatalogLoad, store: S, clock: Arc<dyn Clock>) -> Self {
        let mut notices: Vec<Notice> = catalog
            .warnings
            .iter()
            .map(|warning| Notice {
                source: NoticeSource::Catalog,
                message: warning.to_string(),
            })
            .collect();

        let now = clock.now();
        let snapshot = match store.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    "event=session_open module=service status=error fallback=empty_state error={}",
                    err
                );
                notices.push(Notice {
                    source: NoticeSource::Store,
                    message: format!("Saved progress could not be read ({err}); starting fresh."),
                });
                StoreSnapshot::empty(now)
            }
        };

        let state = SessionState {
            completion: reconcile(&snapshot, now),
            last_update: Some(now),
            ..SessionState::default()
        };
        info!(
            "event=session_open module=service status=ok tasks={} records={} notices={}",
            catalog.tasks.len(),
            state.completion.len(),
            notices.len()
        );

        Self {
            catalog,
            store,
            clock,
            state,
            notices,
        }
    }

    /// Re-applies cadence rollover for a session that outlives one turn.
    pub fn begin_turn(&mut self) {
        let snapshot = StoreSnapshot {
            last_update: self.state.last_update,
            records: std::mem::take(&mut self.state.completion),
        };
        let now = self.clock.now();
        self.state.completion = reconcile(&snapshot, now);
        self.state.last_update = Some(now);
    }

    pub fn catalog(&self) -> &CatalogLoad {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sets one task's completion flag.
    ///
    /// Returns the surprise raised by a false -> true transition, if any.
    /// Setting a flag to its current value changes and writes nothing.
    ///
    /// # Errors
    /// - `UnknownTask` when `key` addresses no displayed task.
    pub fn toggle(
        &mut self,
        key: &str,
        checked: bool,
    ) -> Result<Option<SurpriseEvent>, SessionError> {
        let task = self
            .catalog
            .find(key)
            .ok_or_else(|| SessionError::UnknownTask(key.to_string()))?;
        let surprise = if checked { surprise_for(task) } else { None };

        if self.state.is_checked(key) == checked {
            return Ok(None);
        }

        self.state.completion.insert(key.to_string(), checked);
        if let Some(event) = surprise.clone() {
            self.state.record_surprise(event);
        }
        self.persist("toggle");
        Ok(surprise)
    }

    /// Applies a full checkbox pass, toggling only the flags that changed.
    ///
    /// # Errors
    /// - `UnknownTask` on the first unknown key; earlier changes stay applied.
    pub fn apply_states<I, K>(&mut self, states: I) -> Result<Vec<SurpriseEvent>, SessionError>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let mut surprises = Vec::new();
        for (key, checked) in states {
            if let Some(event) = self.toggle(key.as_ref(), checked)? {
                surprises.push(event);
            }
        }
        Ok(surprises)
    }

    /// Clears every completion flag and persists the empty mapping.
    pub fn reset_all(&mut self) {
        self.state.completion.clear();
        self.state.pending_paid = None;
        self.state.pending_daily = None;
        self.persist("reset");
    }

    /// Hands out pending surprise events once; later calls return nothing
    /// until a new completion happens.
    pub fn take_surprises(&mut self) -> Vec<SurpriseEvent> {
        [self.state.pending_paid.take(), self.state.pending_daily.take()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Builds the render model for the current state.
    pub fn view(&self) -> ChecklistView {
        let groups = Cadence::ALL
            .into_iter()
            .map(|cadence| TaskGroup {
                cadence,
                tasks: self
                    .catalog
                    .tasks_for(cadence)
                    .map(|task| self.task_view(task, cadence))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let checked_tasks = groups
            .iter()
            .flat_map(|group| group.tasks.iter())
            .filter(|task| task.checked);
        let (completed_count, earned_total) = checked_tasks.fold(
            (0usize, RewardAmount::ZERO),
            |(count, earned), task| (count + 1, earned + task.economics.earning()),
        );

        ChecklistView {
            groups,
            earned_total,
            potential_total: self
                .catalog
                .tasks
                .iter()
                .map(|task| task.economics.reward)
                .sum(),
            completed_count,
            total_count: self.catalog.tasks.len(),
            notices: self.notices.clone(),
        }
    }

    fn task_view(&self, task: &Task, cadence: Cadence) -> TaskView {
        let key = task
            .key()
            .map(|key| key.as_str().to_string())
            .unwrap_or_default();
        TaskView {
            checked: self.state.is_checked(key.as_str()),
            key,
            name: task.name.clone(),
            label: task.display_label(),
            cadence,
            economics: task.economics,
        }
    }

    fn persist(&mut self, reason: &str) {
        match self.store.save(&self.state.completion) {
            Ok(()) => {
                self.state.last_update = Some(self.clock.now());
                info!(
                    "event=session_persist module=service status=ok reason={} records={}",
                    reason,
                    self.state.completion.len()
                );
            }
            Err(err) => {
                warn!(
                    "event=session_persist module=service status=error reason={} error={}",
                    reason, err
                );
                self.notices.push(Notice {
                    source: NoticeSource::Store,
                    message: format!("Progress could not be saved ({err})."),
                });
            }
        }
    }
}

fn surprise_for(task: &Task) -> Option<SurpriseEvent> {
    if !task.economics.is_must_do {
        Some(SurpriseEvent::PaidTask(task.name.clone()))
    } else if task.cadence == Some(Cadence::Daily) {
        Some(SurpriseEvent::DailyTask(task.name.clone()))
    } else {
        None
    }
}

/// Opens a session over the configured CSV catalog and JSON state file.
pub fn open_file_session(
    config: &ChecklistConfig,
    clock: Arc<dyn Clock>,
) -> ChecklistSession<JsonFileCompletionStore> {
    let catalog = load_catalog_or_empty(&CsvFileSource::new(config.catalog_path.clone()));
    let store = JsonFileCompletionStore::new(config.state_path.clone(), Arc::clone(&clock));
    ChecklistSession::open(catalog, store, clock)
}
