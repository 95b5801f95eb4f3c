//! Task and cadence model.
//!
//! # Responsibility
//! - Represent one catalog row after normalization.
//! - Map cadences to and from their stable lowercase labels.
//!
//! # Invariants
//! - `TaskKey` text is `<cadence label>_<task name>` and must stay compatible
//!   with existing state files.
//! - Tasks with an unrecognized cadence have no key and belong to no group.

use crate::model::economics::TaskEconomics;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Recurrence class of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// All cadences in display order.
    pub const ALL: [Cadence; 3] = [Cadence::Daily, Cadence::Weekly, Cadence::Monthly];

    /// Stable lowercase label used in task keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Group heading shown by front ends.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Daily => "Daily Tasks",
            Self::Weekly => "Weekly Tasks",
            Self::Monthly => "Monthly Tasks",
        }
    }

    /// Parses free-text cadence values case-insensitively.
    ///
    /// Returns `None` for anything outside `daily|weekly|monthly`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable task identity, `<cadence>_<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(cadence: Cadence, name: &str) -> Self {
        Self(format!("{}_{}", cadence.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Recovers the cadence bucket from the key prefix.
    pub fn cadence(&self) -> Option<Cadence> {
        cadence_of_key(self.0.as_str())
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for TaskKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Returns the cadence bucket encoded in a raw key string.
pub fn cadence_of_key(key: &str) -> Option<Cadence> {
    let (prefix, _) = key.split_once('_')?;
    Cadence::ALL
        .into_iter()
        .find(|cadence| cadence.as_str() == prefix)
}

/// One normalized catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    /// Cadence text exactly as it appeared in the source.
    pub cadence_label: String,
    /// `None` when `cadence_label` is not a recognized cadence.
    pub cadence: Option<Cadence>,
    pub raw_value: String,
    pub economics: TaskEconomics,
}

impl Task {
    /// Builds a task, resolving the cadence label.
    pub fn new(
        name: impl Into<String>,
        cadence_label: impl Into<String>,
        raw_value: impl Into<String>,
        economics: TaskEconomics,
    ) -> Self {
        let cadence_label = cadence_label.into();
        Self {
            name: name.into(),
            cadence: Cadence::parse(cadence_label.as_str()),
            cadence_label,
            raw_value: raw_value.into(),
            economics,
        }
    }

    /// Identity key, or `None` for tasks outside every cadence group.
    pub fn key(&self) -> Option<TaskKey> {
        self.cadence
            .map(|cadence| TaskKey::new(cadence, self.name.as_str()))
    }

    /// Checkbox label, e.g. `Feed cat (£1.50)` or `Make bed (Must do)`.
    pub fn display_label(&self) -> String {
        if self.economics.is_must_do {
            format!("{} (Must do)", self.name)
        } else {
            format!("{} (£{})", self.name, self.economics.reward)
        }
    }
}
