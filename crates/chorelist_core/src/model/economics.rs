//! Reward model derived from a task's raw value text.
//!
//! # Invariants
//! - `RewardAmount` is never negative.
//! - `is_must_do == true` implies the task earns nothing.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;

/// Non-negative money value held as hundredths so that sums stay exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RewardAmount(u64);

impl RewardAmount {
    pub const ZERO: RewardAmount = RewardAmount(0);

    pub fn from_minor_units(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Value in hundredths (pence/cents).
    pub fn minor_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion for progress bars and charts.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Display for RewardAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for RewardAmount {
    type Output = RewardAmount;

    fn add(self, rhs: Self) -> Self::Output {
        RewardAmount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for RewardAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(RewardAmount::ZERO, Add::add)
    }
}

/// Normalized economics of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEconomics {
    pub is_must_do: bool,
    pub reward: RewardAmount,
}

impl TaskEconomics {
    /// Obligation with no pay.
    pub fn must_do() -> Self {
        Self {
            is_must_do: true,
            reward: RewardAmount::ZERO,
        }
    }

    pub fn paid(reward: RewardAmount) -> Self {
        Self {
            is_must_do: false,
            reward,
        }
    }

    /// Neither paid nor must-do.
    pub fn inert() -> Self {
        Self::default()
    }

    /// Amount this task adds to earnings once checked.
    pub fn earning(&self) -> RewardAmount {
        if self.is_must_do {
            RewardAmount::ZERO
        } else {
            self.reward
        }
    }
}
