//! End-to-end tests for the lab session.
//!
//! Most tests run against a [`MemoryStore`] and a [`ManualClock`] pinned to
//! a fixed instant; the persistence tests use a temporary directory.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use worldline_core::config::DialogueConfig;
use worldline_core::{
    GameEvent, Lab, LabConfig, LabError, ManualClock, SystemClock, worldline_of,
};
use worldline_db::{FileStore, MemoryStore, RecordKey, RecordStore};
use worldline_ledger::ReconciliationResult;
use worldline_tracker::{NewTask, TrackerError};
use worldline_types::{GameState, Mood, NarrativeContext, QuoteContext, TaskPriority, XpEventType};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

fn seeded_config(seed: u64) -> LabConfig {
    LabConfig {
        dialogue: DialogueConfig {
            seed: Some(seed),
            ..DialogueConfig::default()
        },
        ..LabConfig::default()
    }
}

fn memory_lab() -> Lab<MemoryStore, ManualClock> {
    Lab::open(seeded_config(7), MemoryStore::new(), ManualClock::new(noon())).unwrap()
}

// =========================================================================
// Progression
// =========================================================================

#[test]
fn first_run_starts_from_defaults() {
    let lab = memory_lab();
    assert_eq!(lab.state(), &GameState::default());
    assert!(lab.ledger().is_empty());

    let dash = lab.dashboard();
    assert_eq!(dash.level(), 1);
    assert_eq!(dash.worldline, worldline_of(0));
    assert!(dash.proximity >= Decimal::ZERO && dash.proximity <= Decimal::ONE_HUNDRED);
    assert!(dash.feedback.is_none());
}

#[test]
fn completing_a_task_awards_its_priority_xp() {
    let mut lab = memory_lab();
    let id = lab
        .create_task(NewTask {
            priority: TaskPriority::Medium,
            ..NewTask::titled("Finish lab report")
        })
        .unwrap();

    let tracked = lab.toggle_task(id).unwrap();
    assert!(tracked.record.completed);
    assert_eq!(tracked.outcome.context, NarrativeContext::Success);
    assert_eq!(lab.state().xp, 30);
    assert_eq!(lab.state().last_active, Some(noon()));

    let entries = lab.ledger().all_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event_type, XpEventType::Task);
    assert_eq!(entries[0].value, 30);
    assert_eq!(entries[0].reason, "Finish lab report");

    let saved: GameState = lab.store().load_json(RecordKey::GameState).unwrap().unwrap();
    assert_eq!(saved.xp, 30);
}

#[test]
fn reopening_a_task_revokes_its_xp() {
    let mut lab = memory_lab();
    let id = lab.create_task(NewTask::titled("Read chapter 3")).unwrap();
    lab.toggle_task(id).unwrap();
    let reopened = lab.toggle_task(id).unwrap();

    assert!(!reopened.record.completed);
    assert_eq!(reopened.outcome.context, NarrativeContext::Failure);
    assert_eq!(lab.state().xp, 0);
    assert_eq!(lab.reconcile(), ReconciliationResult::Balanced);
}

#[test]
fn penalty_past_zero_is_clamped_and_reconciles() {
    let mut lab = memory_lab();
    lab.record_event(GameEvent::new(XpEventType::Bonus, 5, "Warm-up"));
    let outcome = lab.record_event(GameEvent::new(XpEventType::Habit, -10, "Morning run"));

    assert_eq!(lab.state().xp, 0);
    assert_eq!(outcome.event.value, -5);
    assert_eq!(outcome.event.requested, -10);
    assert_eq!(lab.reconcile(), ReconciliationResult::Balanced);
}

#[test]
fn level_up_feedback_becomes_last_message() {
    let mut lab = memory_lab();
    let outcome = lab.record_event(GameEvent::new(XpEventType::Bonus, 120, "Milestone"));

    assert!(outcome.leveled_up());
    assert_eq!(lab.dashboard().level(), 2);
    assert_eq!(
        lab.last_message().and_then(|m| m.context),
        Some(NarrativeContext::LevelUp)
    );
}

#[test]
fn seeded_sessions_greet_identically() {
    let mut a = memory_lab();
    let mut b = memory_lab();
    assert_eq!(a.greet(), b.greet());
    assert_eq!(a.last_message().map(|m| m.context), Some(Some(NarrativeContext::Greeting)));
}

// =========================================================================
// Habits
// =========================================================================

#[test]
fn habit_toggle_moves_xp_and_streak_together() {
    let mut lab = memory_lab();
    let id = lab.create_habit("Morning run", None).unwrap();

    let done = lab.toggle_habit(id).unwrap();
    assert!(done.record.completed_today);
    assert_eq!(lab.state().xp, 10);
    assert_eq!(lab.state().streak, 1);

    let undone = lab.toggle_habit(id).unwrap();
    assert!(!undone.record.completed_today);
    assert_eq!(lab.state().xp, 0);
    assert_eq!(lab.state().streak, 0);
}

#[test]
fn habit_can_be_completed_again_the_next_day() {
    let mut lab = memory_lab();
    let id = lab.create_habit("Flashcards", Some(15)).unwrap();
    lab.toggle_habit(id).unwrap();

    lab.clock().advance(Duration::days(1));
    let next = lab.toggle_habit(id).unwrap();

    assert!(next.record.completed_today);
    assert_eq!(next.record.streak, 2);
    assert_eq!(lab.state().xp, 30);
    assert_eq!(lab.state().streak, 2);
}

#[test]
fn blank_habit_name_is_rejected() {
    let mut lab = memory_lab();
    let err = lab.create_habit("   ", None).unwrap_err();
    assert!(matches!(
        err,
        LabError::Tracker(TrackerError::EmptyName { .. })
    ));
    assert!(lab.habits().is_empty());
}

// =========================================================================
// Study sessions
// =========================================================================

#[test]
fn study_elapsed_time_comes_from_the_start_instant() {
    let mut lab = memory_lab();
    lab.start_study("Physics").unwrap();
    assert_eq!(lab.study_elapsed_minutes(), Some(0));

    lab.clock().advance(Duration::minutes(25));
    assert_eq!(lab.study_elapsed_minutes(), Some(25));

    let tracked = lab.finish_study().unwrap();
    assert_eq!(tracked.record.duration_minutes, 25);
    assert_eq!(tracked.record.xp_gained, 50);
    assert_eq!(tracked.outcome.event.reason, "Physics (25m)");
    assert_eq!(lab.state().xp, 50);
    assert_eq!(lab.study_elapsed_minutes(), None);
    assert_eq!(lab.study_minutes_today(), 25);
}

#[test]
fn cancelled_study_records_nothing() {
    let mut lab = memory_lab();
    lab.start_study("Chemistry").unwrap();
    assert!(lab.cancel_study().is_some());
    assert!(lab.study().sessions().is_empty());
    assert!(lab.ledger().is_empty());
    assert!(matches!(
        lab.finish_study(),
        Err(LabError::Tracker(TrackerError::NoActiveSession))
    ));
}

#[test]
fn manual_study_session_awards_xp() {
    let mut lab = memory_lab();
    let tracked = lab.log_study("Maths", 40).unwrap();
    assert_eq!(tracked.record.xp_gained, 80);
    assert_eq!(lab.state().xp, 80);
}

fn counting_sink() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |minutes| sink.lock().unwrap().push(minutes))
}

#[tokio::test(start_paused = true)]
async fn study_ticker_reports_while_the_session_runs() {
    let mut lab = Lab::open(seeded_config(1), MemoryStore::new(), SystemClock).unwrap();
    assert!(!lab.start_study_ticker(|_| {}));
    assert!(!lab.study_ticker_running());

    lab.start_study("History").unwrap();
    let (seen, sink) = counting_sink();
    assert!(lab.start_study_ticker(sink));

    tokio::time::sleep(StdDuration::from_millis(3_500)).await;
    assert_eq!(seen.lock().unwrap().len(), 3);
    assert!(lab.study_ticker_running());
}

#[tokio::test(start_paused = true)]
async fn finishing_a_study_session_stops_its_ticker() {
    let mut lab = Lab::open(seeded_config(1), MemoryStore::new(), SystemClock).unwrap();
    lab.start_study("Physics").unwrap();
    let (seen, sink) = counting_sink();
    assert!(lab.start_study_ticker(sink));

    tokio::time::sleep(StdDuration::from_millis(1_500)).await;
    lab.finish_study().unwrap();
    let at_finish = seen.lock().unwrap().len();
    assert_eq!(at_finish, 1);
    assert!(!lab.study_ticker_running());

    tokio::time::sleep(StdDuration::from_secs(5)).await;
    assert_eq!(seen.lock().unwrap().len(), at_finish);
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_study_session_stops_its_ticker() {
    let mut lab = Lab::open(seeded_config(1), MemoryStore::new(), SystemClock).unwrap();
    lab.start_study("Chemistry").unwrap();
    let (seen, sink) = counting_sink();
    assert!(lab.start_study_ticker(sink));

    tokio::time::sleep(StdDuration::from_millis(2_500)).await;
    assert!(lab.cancel_study().is_some());
    let at_cancel = seen.lock().unwrap().len();
    assert_eq!(at_cancel, 2);

    tokio::time::sleep(StdDuration::from_secs(5)).await;
    assert_eq!(seen.lock().unwrap().len(), at_cancel);
    assert!(!lab.study_ticker_running());
}

// =========================================================================
// Daily logs and views
// =========================================================================

#[test]
fn daily_log_is_stamped_with_todays_net_xp() {
    let mut lab = memory_lab();
    lab.record_event(GameEvent::new(XpEventType::Task, 30, "Lab report"));
    lab.record_event(GameEvent::new(XpEventType::Penalty, -5, "Overslept"));

    let log = lab.save_daily_log(Mood::Happy, 8, "  steady day ").unwrap();
    assert_eq!(log.xp_gained, 25);
    assert_eq!(log.divergence, 0);
    assert_eq!(log.notes, "steady day");
    assert_eq!(lab.daily_log(log.date), log);

    let err = lab.save_daily_log(Mood::Sad, 11, "").unwrap_err();
    assert!(matches!(
        err,
        LabError::Tracker(TrackerError::ProductivityOutOfRange { value: 11, .. })
    ));
}

#[test]
fn xp_log_is_most_recent_first_with_todays_totals() {
    let mut lab = memory_lab();
    for (delta, reason) in [(10, "a"), (20, "b"), (-5, "c")] {
        lab.record_event(GameEvent::new(XpEventType::Bonus, delta, reason));
    }

    let view = lab.xp_log(2);
    assert_eq!(view.today_net, 25);
    assert_eq!(view.today_count, 3);
    let reasons: Vec<&str> = view.entries.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(reasons, vec!["c", "b"]);
}

#[test]
fn worldline_history_tracks_divergence_changes() {
    let mut lab = memory_lab();
    lab.record_event(GameEvent::new(XpEventType::Task, 30, "first"));
    lab.record_event(GameEvent::new(XpEventType::Task, 30, "second"));
    lab.record_event(GameEvent::new(XpEventType::Task, 0, "no-op"));

    let view = lab.worldline_history(10);
    assert_eq!(view.current, worldline_of(2));
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.entries[0].event, "second");
    assert_eq!(view.entries[0].value, worldline_of(2).to_string());
    assert_eq!(lab.worldline_history(1).entries.len(), 1);
}

#[test]
fn quotes_fall_back_for_unknown_labels() {
    let mut lab = memory_lab();
    assert_eq!(lab.quote("tea-time"), worldline_agents::DEFAULT_QUOTE);
    let morning = lab.daily_quote(QuoteContext::Morning);
    assert_eq!(lab.daily_quote(QuoteContext::Morning), morning);
}

// =========================================================================
// Persistence
// =========================================================================

#[test]
fn failed_saves_are_retried_on_the_next_action() {
    let mut lab = memory_lab();
    lab.store_mut().set_read_only(true);
    lab.record_event(GameEvent::new(XpEventType::Bonus, 40, "Offline"));

    // In-memory state stays authoritative.
    assert_eq!(lab.state().xp, 40);
    assert!(lab.pending_saves().contains(&RecordKey::GameState));

    lab.store_mut().set_read_only(false);
    lab.record_event(GameEvent::new(XpEventType::Bonus, 2, "Back online"));
    assert!(lab.pending_saves().is_empty());

    let reopened = Lab::open(
        seeded_config(7),
        lab.store().clone(),
        ManualClock::new(noon()),
    )
    .unwrap();
    assert_eq!(reopened.state().xp, 42);
    assert_eq!(reopened.ledger().len(), 2);
}

#[test]
fn flush_reports_failures() {
    let mut lab = memory_lab();
    lab.store_mut().set_read_only(true);
    lab.record_event(GameEvent::new(XpEventType::Bonus, 1, "x"));

    let report = lab.flush();
    assert!(!report.is_clean());
    assert!(report.failed.contains(&RecordKey::XpEvents));

    lab.store_mut().set_read_only(false);
    let report = lab.flush();
    assert!(report.is_clean());
    assert!(report.saved.contains(&RecordKey::XpEvents));
}

#[test]
fn corrupt_record_is_treated_as_first_run() {
    let mut store = MemoryStore::new();
    store.save_raw(RecordKey::GameState, "{not json").unwrap();
    let lab = Lab::open(seeded_config(7), store, ManualClock::new(noon())).unwrap();
    assert_eq!(lab.state(), &GameState::default());
}

#[test]
fn zero_level_step_is_rejected() {
    let mut config = seeded_config(7);
    config.progression.level_step = 0;
    let result = Lab::open(config, MemoryStore::new(), ManualClock::new(noon()));
    assert!(matches!(result, Err(LabError::Config(_))));
}

#[test]
fn everything_survives_a_restart_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = seeded_config(7);
    config.storage.data_dir = tmp.path().join("data");

    let (state, habits, worldlines) = {
        let mut lab = Lab::open_data_dir(config.clone()).unwrap();
        let habit = lab.create_habit("Meditate", None).unwrap();
        lab.toggle_habit(habit).unwrap();
        let task = lab.create_task(NewTask::titled("Email professor")).unwrap();
        lab.toggle_task(task).unwrap();
        lab.log_study("Biology", 10).unwrap();
        lab.save_daily_log(Mood::Content, 6, "ok").unwrap();
        (
            lab.state().clone(),
            lab.habits().clone(),
            lab.worldline_history(10),
        )
    };

    let store = FileStore::open(&config.storage.data_dir).unwrap();
    let lab = Lab::open(config, store, SystemClock).unwrap();
    assert_eq!(lab.state(), &state);
    assert_eq!(lab.state().xp, 10 + 30 + 20);
    assert_eq!(lab.habits().len(), habits.len());
    assert_eq!(lab.tasks().len(), 1);
    assert_eq!(lab.study().sessions().len(), 1);
    assert_eq!(lab.journal().logs().len(), 1);
    assert_eq!(lab.ledger().len(), 3);
    assert_eq!(lab.worldline_history(10), worldlines);
    assert_eq!(lab.reconcile(), ReconciliationResult::Balanced);
}
