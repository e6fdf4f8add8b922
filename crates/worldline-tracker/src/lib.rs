//! Tracker collections: the sources of XP deltas.
//!
//! Each collection owns its records and lifecycle. Mutations that earn or
//! revoke XP return an [`XpReport`] describing the delta; the caller feeds
//! that into the progression controller. Nothing in this crate touches the
//! XP total directly.
//!
//! # Modules
//!
//! - [`error`] -- Validation and lookup errors ([`TrackerError`])
//! - [`habits`] -- Daily habits with per-habit streaks ([`HabitBook`])
//! - [`journal`] -- One daily log per calendar date ([`Journal`])
//! - [`study`] -- Timed and manual study sessions ([`StudyLog`])
//! - [`tasks`] -- One-off tasks with priority-based XP ([`TaskBook`])

pub mod error;
pub mod habits;
pub mod journal;
pub mod study;
pub mod tasks;

use serde::{Deserialize, Serialize};

use worldline_types::XpEventType;

pub use error::TrackerError;
pub use habits::{DEFAULT_HABIT_XP, HabitBook, HabitToggle};
pub use journal::{Journal, MAX_PRODUCTIVITY};
pub use study::{ActiveStudySession, DEFAULT_XP_PER_MINUTE, StudyLog, StudyOutcome};
pub use tasks::{NewTask, TaskBook, TaskRewards, TaskToggle};

/// An XP delta reported by a tracker collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpReport {
    /// Which kind of record produced the delta.
    pub event_type: XpEventType,
    /// Requested signed XP change.
    pub delta: i64,
    /// Label for the ledger entry.
    pub reason: String,
}
