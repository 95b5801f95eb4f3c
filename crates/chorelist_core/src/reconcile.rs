//! Cadence rollover and completion reconciliation.
//!
//! # Responsibility
//! - Decide which cadence buckets rolled over between the last stored update
//!   and "now".
//! - Clear the completion flags of every rolled bucket.
//!
//! # Invariants
//! - Pure function of `(last_update, now, records)`; never writes storage.
//! - Buckets roll independently and by calendar unit, not elapsed time.
//! - Daily rolls only when `now` is on a strictly later date.
//! - Weekly rolls whenever the ISO week *number* differs, in either direction;
//!   the ISO year is deliberately ignored.
//! - Monthly rolls when month or year differ.
//! - Keys without a recognized cadence prefix are never touched.

use crate::model::task::{cadence_of_key, Cadence};
use crate::store::{CompletionMap, StoreSnapshot};
use chrono::{Datelike, NaiveDateTime};
use log::info;

/// Buckets whose period elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    pub daily: bool,
    pub weekly: bool,
    pub monthly: bool,
}

impl Rollover {
    pub fn includes(&self, cadence: Cadence) -> bool {
        match cadence {
            Cadence::Daily => self.daily,
            Cadence::Weekly => self.weekly,
            Cadence::Monthly => self.monthly,
        }
    }

    pub fn any(&self) -> bool {
        self.daily || self.weekly || self.monthly
    }
}

/// Computes which buckets rolled over from `last` to `now`.
pub fn rollover(last: NaiveDateTime, now: NaiveDateTime) -> Rollover {
    let last_date = last.date();
    let now_date = now.date();

    Rollover {
        daily: now_date > last_date,
        weekly: now_date.iso_week().week() != last_date.iso_week().week(),
        monthly: now_date.month() != last_date.month() || now_date.year() != last_date.year(),
    }
}

/// Returns the snapshot's records with rolled buckets cleared to `false`.
pub fn reconcile(snapshot: &StoreSnapshot, now: NaiveDateTime) -> CompletionMap {
    let Some(last_update) = snapshot.last_update else {
        return snapshot.records.clone();
    };

    let rolled = rollover(last_update, now);
    if !rolled.any() {
        return snapshot.records.clone();
    }

    let mut cleared = 0usize;
    let records = snapshot
        .records
        .iter()
        .map(|(key, &completed)| {
            let stale = cadence_of_key(key).is_some_and(|cadence| rolled.includes(cadence));
            if stale && completed {
                cleared += 1;
            }
            (key.clone(), completed && !stale)
        })
        .collect();

    info!(
        "event=reconcile module=reconcile status=ok daily={} weekly={} monthly={} cleared={}",
        rolled.daily, rolled.weekly, rolled.monthly, cleared
    );
    records
}
