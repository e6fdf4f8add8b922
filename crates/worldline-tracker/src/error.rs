//! Error types for the `worldline-tracker` crate.
//!
//! The panels validate input before calling in, so these normally never
//! fire. They exist so a bad call is reported instead of silently ignored.

use worldline_types::{HabitId, TaskId};

/// Errors that can occur during tracker operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// A habit name or task title was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Which field was empty.
        field: &'static str,
    },

    /// No habit with this ID exists.
    #[error("habit not found: {0}")]
    HabitNotFound(HabitId),

    /// No task with this ID exists.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A study session was started while another is running.
    #[error("a study session for '{subject}' is already running")]
    SessionAlreadyActive {
        /// Subject of the running session.
        subject: String,
    },

    /// A study session was finished while none is running.
    #[error("no study session is running")]
    NoActiveSession,

    /// A manual study session had a zero duration.
    #[error("study duration must be at least one minute")]
    ZeroDuration,

    /// A daily log productivity rating was outside the allowed range.
    #[error("productivity {value} is out of range (max {max})")]
    ProductivityOutOfRange {
        /// The rejected rating.
        value: u8,
        /// The maximum rating.
        max: u8,
    },

    /// An arithmetic overflow occurred while computing XP.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
