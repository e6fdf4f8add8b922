//! Core record structs for the Worldline progression engine.
//!
//! [`GameState`] is the single persisted progression snapshot. [`XpEvent`]
//! and [`WorldlineEntry`] are append-only history records. The remaining
//! structs are tracker records owned by their collections; they report XP
//! deltas inward but are not owned by the progression engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Mood, TaskPriority, XpEventType};
use crate::ids::{HabitId, StudySessionId, TaskId, WorldlineEntryId, XpEventId};

// ---------------------------------------------------------------------------
// Progression snapshot
// ---------------------------------------------------------------------------

/// The process-wide progression snapshot.
///
/// Treated as an immutable value: every update produces a new snapshot
/// which replaces the previous one wholesale. Level is never stored; it is
/// always derived from `xp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Accumulated experience points. Never negative.
    pub xp: u64,
    /// Global habit streak, adjusted by the habit tracker.
    pub streak: u32,
    /// Cumulative narrative drift. Unbounded in both directions.
    pub divergence: i64,
    /// When the last XP-affecting action happened (`None` on first run).
    pub last_active: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// History records
// ---------------------------------------------------------------------------

/// One append-only XP ledger entry.
///
/// `value` is the change that was actually applied to the XP total, which
/// differs from `requested` only when the total was clamped at zero. The sum
/// of `value` over any epoch equals the net change in XP over that epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpEvent {
    /// Unique entry identifier.
    pub id: XpEventId,
    /// Gameplay source of the change.
    #[serde(rename = "type")]
    pub event_type: XpEventType,
    /// Signed XP delta actually applied.
    pub value: i64,
    /// Signed XP delta the caller asked for.
    pub requested: i64,
    /// Free-text label, usually the habit or task name.
    pub reason: String,
    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
}

impl XpEvent {
    /// Whether the XP floor reduced the requested delta.
    pub const fn was_clamped(&self) -> bool {
        self.value != self.requested
    }
}

/// A historical worldline reading, appended whenever divergence changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldlineEntry {
    /// Unique entry identifier.
    pub id: WorldlineEntryId,
    /// Worldline reading at the time, e.g. `"1.048596"`.
    pub value: String,
    /// Divergence counter at the time.
    pub divergence: i64,
    /// What triggered the recomputation.
    pub event: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tracker records
// ---------------------------------------------------------------------------

/// A daily habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Habit {
    /// Unique habit identifier.
    pub id: HabitId,
    /// Display name.
    pub name: String,
    /// XP awarded on completion (and revoked on un-completion).
    pub xp_value: u32,
    /// Per-habit streak.
    pub streak: u32,
    /// Whether the habit has been completed on the current day.
    pub completed_today: bool,
    /// When the habit was last marked complete.
    pub last_completed: Option<DateTime<Utc>>,
    /// When the habit was created.
    pub created_at: DateTime<Utc>,
}

/// A one-off task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// What needs doing.
    pub title: String,
    /// Optional due date.
    pub deadline: Option<NaiveDate>,
    /// Priority, which also determines the XP value.
    pub priority: TaskPriority,
    /// XP awarded on completion (and revoked on re-opening).
    pub xp_value: u32,
    /// Whether the task is done.
    pub completed: bool,
    /// Free-form grouping label.
    pub category: String,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

/// A finished study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StudySession {
    /// Unique session identifier.
    pub id: StudySessionId,
    /// What was studied.
    pub subject: String,
    /// Session length in whole minutes (at least 1).
    pub duration_minutes: u32,
    /// When the session was recorded.
    pub timestamp: DateTime<Utc>,
    /// XP earned by the session.
    pub xp_gained: u32,
}

/// One journal entry per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyLog {
    /// The calendar date this log covers.
    pub date: NaiveDate,
    /// Mood for the day.
    pub mood: Mood,
    /// Self-rated productivity, 1 to 10.
    pub productivity: u8,
    /// Free-form notes.
    pub notes: String,
    /// Net XP gained on the day.
    pub xp_gained: i64,
    /// Divergence counter at time of writing.
    pub divergence: i64,
}

impl DailyLog {
    /// A blank log for `date`: neutral mood, productivity 5.
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            date,
            mood: Mood::Neutral,
            productivity: 5,
            notes: String::new(),
            xp_gained: 0,
            divergence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_game_state_is_zeroed() {
        let state = GameState::default();
        assert_eq!(state.xp, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.divergence, 0);
        assert!(state.last_active.is_none());
    }

    #[test]
    fn xp_event_type_field_is_named_type() {
        let event = XpEvent {
            id: XpEventId::new(),
            event_type: XpEventType::Task,
            value: 30,
            requested: 30,
            reason: "Finish lab report".to_owned(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("task"));
        assert!(!event.was_clamped());
    }

    #[test]
    fn game_state_roundtrips_value_for_value() {
        let state = GameState {
            xp: 1_234,
            streak: 7,
            divergence: -42,
            last_active: Some(Utc::now()),
        };
        let json = serde_json::to_string(&state).unwrap_or_default();
        let restored: Option<GameState> = serde_json::from_str(&json).ok();
        assert_eq!(restored, Some(state));
    }

    #[test]
    fn blank_log_uses_neutral_defaults() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap_or_default();
        let log = DailyLog::blank(date);
        assert_eq!(log.mood, Mood::Neutral);
        assert_eq!(log.productivity, 5);
        assert!(log.notes.is_empty());
    }
}
