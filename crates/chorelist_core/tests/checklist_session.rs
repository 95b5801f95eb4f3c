use chorelist_core::{
    load_catalog, Cadence, CatalogError, CatalogLoad, CatalogTable, ChecklistSession,
    CompletionMap, CompletionStore, FixedClock, InMemoryCompletionStore, JsonFileCompletionStore,
    NoticeSource, RewardAmount, SessionError, StoreSnapshot, SurpriseEvent,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn catalog() -> CatalogLoad {
    load_catalog(&CatalogTable::from_rows(
        &["Task", "Cadence", "Value"],
        &[
            &["Make bed", "Daily", "Must do"],
            &["Feed cat", "Daily", "£0.50"],
            &["Tidy room", "Weekly", "£2.00"],
            &["Homework", "Weekly", "Must do"],
            &["Wash car", "Monthly", "£5"],
            &["Clean gutters", "Yearly", "£20"],
        ],
    ))
    .unwrap()
}

fn memory_session(
    clock: &Arc<FixedClock>,
) -> ChecklistSession<Arc<InMemoryCompletionStore>> {
    let store = Arc::new(InMemoryCompletionStore::new(clock.clone()));
    ChecklistSession::open(catalog(), store, clock.clone())
}

#[test]
fn fresh_session_starts_unchecked_with_potential_total() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let session = memory_session(&clock);
    let view = session.view();

    assert_eq!(view.completed_count, 0);
    assert_eq!(view.total_count, 6);
    assert_eq!(view.earned_total, RewardAmount::ZERO);
    assert_eq!(view.potential_total, RewardAmount::from_minor_units(2_750));
    assert_eq!(view.progress_ratio(), 0.0);
    assert!(view.notices.is_empty());

    let daily = view.group(Cadence::Daily).unwrap();
    let labels: Vec<&str> = daily.tasks.iter().map(|task| task.label.as_str()).collect();
    assert_eq!(labels, vec!["Make bed (Must do)", "Feed cat (£0.50)"]);
}

#[test]
fn unknown_cadence_task_is_not_rendered() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let view = memory_session(&clock).view();
    let rendered: usize = view.groups.iter().map(|group| group.tasks.len()).sum();
    assert_eq!(rendered, 5);
    assert!(view
        .groups
        .iter()
        .flat_map(|group| group.tasks.iter())
        .all(|task| task.name != "Clean gutters"));
}

#[test]
fn toggling_paid_task_earns_and_raises_paid_surprise() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    let surprise = session.toggle("weekly_Tidy room", true).unwrap();
    assert_eq!(surprise, Some(SurpriseEvent::PaidTask("Tidy room".to_string())));

    let view = session.view();
    assert_eq!(view.completed_count, 1);
    assert_eq!(view.earned_total, RewardAmount::from_minor_units(200));
}

#[test]
fn must_do_tasks_never_earn_and_only_daily_ones_surprise() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    assert_eq!(
        session.toggle("daily_Make bed", true).unwrap(),
        Some(SurpriseEvent::DailyTask("Make bed".to_string()))
    );
    assert_eq!(session.toggle("weekly_Homework", true).unwrap(), None);

    let view = session.view();
    assert_eq!(view.completed_count, 2);
    assert_eq!(view.earned_total, RewardAmount::ZERO);
}

#[test]
fn unchecking_raises_nothing_and_lowers_earnings() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    session.toggle("daily_Feed cat", true).unwrap();
    assert_eq!(session.toggle("daily_Feed cat", false).unwrap(), None);
    assert_eq!(session.view().earned_total, RewardAmount::ZERO);
}

#[test]
fn repeated_value_is_not_a_transition() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    session.toggle("daily_Feed cat", true).unwrap();
    assert_eq!(session.toggle("daily_Feed cat", true).unwrap(), None);
    assert_eq!(session.toggle("monthly_Wash car", false).unwrap(), None);
    assert_eq!(session.store().save_count(), 1);
}

#[test]
fn unknown_keys_are_rejected() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    assert_eq!(
        session.toggle("yearly_Clean gutters", true),
        Err(SessionError::UnknownTask("yearly_Clean gutters".to_string()))
    );
    assert_eq!(
        session.toggle("daily_Nope", true),
        Err(SessionError::UnknownTask("daily_Nope".to_string()))
    );
    assert_eq!(session.store().save_count(), 0);
}

#[test]
fn surprises_are_handed_out_once_and_keep_the_latest_per_class() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    session.toggle("daily_Feed cat", true).unwrap();
    session.toggle("weekly_Tidy room", true).unwrap();
    session.toggle("daily_Make bed", true).unwrap();

    assert_eq!(
        session.take_surprises(),
        vec![
            SurpriseEvent::PaidTask("Tidy room".to_string()),
            SurpriseEvent::DailyTask("Make bed".to_string()),
        ]
    );
    assert!(session.take_surprises().is_empty());
}

#[test]
fn apply_states_only_toggles_changed_boxes() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    let surprises = session
        .apply_states([
            ("daily_Make bed", false),
            ("daily_Feed cat", true),
            ("monthly_Wash car", true),
        ])
        .unwrap();

    assert_eq!(surprises.len(), 2);
    assert_eq!(session.store().save_count(), 2);
    assert_eq!(
        session.view().earned_total,
        RewardAmount::from_minor_units(550)
    );
}

#[test]
fn every_transition_is_written_through() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);

    session.toggle("daily_Feed cat", true).unwrap();
    let persisted = session.store().persisted().unwrap();
    assert_eq!(persisted.records["daily_Feed cat"], true);
    assert_eq!(persisted.last_update, Some(at(2024, 5, 1, 8)));
}

#[test]
fn reset_all_clears_state_and_persists_empty_mapping() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);
    session.toggle("daily_Feed cat", true).unwrap();
    session.toggle("weekly_Tidy room", true).unwrap();

    session.reset_all();

    assert_eq!(session.view().completed_count, 0);
    assert!(session.take_surprises().is_empty());
    assert!(session.store().persisted().unwrap().records.is_empty());
}

#[test]
fn restart_restores_state_except_rolled_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));

    let mut session = ChecklistSession::open(
        catalog(),
        JsonFileCompletionStore::new(&path, clock.clone()),
        clock.clone(),
    );
    session.toggle("daily_Feed cat", true).unwrap();
    session.toggle("weekly_Tidy room", true).unwrap();
    drop(session);

    let same_day = ChecklistSession::open(
        catalog(),
        JsonFileCompletionStore::new(&path, clock.clone()),
        clock.clone(),
    );
    assert!(same_day.state().is_checked("daily_Feed cat"));
    assert!(same_day.state().is_checked("weekly_Tidy room"));
    drop(same_day);

    // 2024-05-01 is a Wednesday; the next day stays in the same ISO week.
    clock.set(at(2024, 5, 2, 7));
    let next_day = ChecklistSession::open(
        catalog(),
        JsonFileCompletionStore::new(&path, clock.clone()),
        clock.clone(),
    );
    assert!(!next_day.state().is_checked("daily_Feed cat"));
    assert!(next_day.state().is_checked("weekly_Tidy room"));
    assert_eq!(next_day.view().earned_total, RewardAmount::from_minor_units(200));
}

#[test]
fn reconciliation_alone_does_not_write() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 2, 8)));
    let store = Arc::new(InMemoryCompletionStore::with_snapshot(
        clock.clone(),
        StoreSnapshot {
            last_update: Some(at(2024, 5, 1, 8)),
            records: CompletionMap::from([("daily_Feed cat".to_string(), true)]),
        },
    ));

    let session = ChecklistSession::open(catalog(), store.clone(), clock.clone());
    assert!(!session.state().is_checked("daily_Feed cat"));
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.persisted().unwrap().records["daily_Feed cat"], true);
}

#[test]
fn begin_turn_applies_rollover_in_long_lived_sessions() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 20)));
    let mut session = memory_session(&clock);
    session.toggle("daily_Feed cat", true).unwrap();

    clock.set(at(2024, 5, 2, 7));
    session.begin_turn();
    assert!(!session.state().is_checked("daily_Feed cat"));
}

#[test]
fn begin_turn_keeps_same_day_toggles_when_writes_fail() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 2, 8)));
    let store = Arc::new(InMemoryCompletionStore::with_snapshot(
        clock.clone(),
        StoreSnapshot {
            last_update: Some(at(2024, 5, 1, 20)),
            records: CompletionMap::new(),
        },
    ));
    let mut session = ChecklistSession::open(catalog(), store.clone(), clock.clone());
    store.set_fail_writes(true);
    session.toggle("daily_Feed cat", true).unwrap();

    clock.set(at(2024, 5, 2, 9));
    session.begin_turn();
    assert!(session.state().is_checked("daily_Feed cat"));
    assert_eq!(session.state().last_update, Some(at(2024, 5, 2, 9)));
}

#[test]
fn unreadable_state_degrades_to_empty_with_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json").unwrap();
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));

    let mut session = ChecklistSession::open(
        catalog(),
        JsonFileCompletionStore::new(&path, clock.clone()),
        clock.clone(),
    );
    let view = session.view();
    assert_eq!(view.completed_count, 0);
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].source, NoticeSource::Store);

    // The next change overwrites the corrupt file with a valid snapshot.
    session.toggle("daily_Feed cat", true).unwrap();
    let reloaded = JsonFileCompletionStore::new(&path, clock).load().unwrap();
    assert_eq!(reloaded.records["daily_Feed cat"], true);
}

#[test]
fn failed_write_becomes_a_notice_not_an_error() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);
    session.store().set_fail_writes(true);

    let surprise = session.toggle("daily_Feed cat", true).unwrap();
    assert!(surprise.is_some());
    assert!(session.state().is_checked("daily_Feed cat"));

    let view = session.view();
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].source, NoticeSource::Store);
}

#[test]
fn empty_catalog_keeps_the_session_usable() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let catalog = CatalogLoad::unavailable(CatalogError::Fetch {
        source_name: "sheet".to_string(),
        message: "offline".to_string(),
    });
    let store = Arc::new(InMemoryCompletionStore::new(clock.clone()));
    let mut session = ChecklistSession::open(catalog, store, clock.clone());

    let view = session.view();
    assert_eq!(view.total_count, 0);
    assert_eq!(view.progress_ratio(), 0.0);
    assert_eq!(view.notices[0].source, NoticeSource::Catalog);

    session.reset_all();
    assert_eq!(session.view().completed_count, 0);
}

#[test]
fn progress_ratio_counts_catalog_rows() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let mut session = memory_session(&clock);
    session.toggle("daily_Feed cat", true).unwrap();
    session.toggle("daily_Make bed", true).unwrap();
    session.toggle("weekly_Tidy room", true).unwrap();

    let view = session.view();
    assert_eq!(view.completed_count, 3);
    assert!((view.progress_ratio() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn store_trait_is_usable_through_references() {
    let clock = Arc::new(FixedClock::new(at(2024, 5, 1, 8)));
    let store = InMemoryCompletionStore::new(clock.clone());
    {
        let mut session = ChecklistSession::open(catalog(), &store, clock.clone());
        session.toggle("monthly_Wash car", true).unwrap();
    }
    assert_eq!(store.load().unwrap().records["monthly_Wash car"], true);
}
