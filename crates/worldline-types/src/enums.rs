//! Enumeration types for the Worldline progression engine.
//!
//! Every enum serializes as its lowercase label so persisted records read
//! the same as the labels the dashboard panels use.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// XP event types
// ---------------------------------------------------------------------------

/// The gameplay source of an XP ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum XpEventType {
    /// A daily habit was completed or un-completed.
    Habit,
    /// A task was completed or re-opened.
    Task,
    /// A study session was logged.
    Study,
    /// A manual deduction.
    Penalty,
    /// A manual award.
    Bonus,
}

impl XpEventType {
    /// Every event type, in display order.
    pub const ALL: [Self; 5] = [
        Self::Habit,
        Self::Task,
        Self::Study,
        Self::Penalty,
        Self::Bonus,
    ];

    /// The lowercase label used in persisted records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Habit => "habit",
            Self::Task => "task",
            Self::Study => "study",
            Self::Penalty => "penalty",
            Self::Bonus => "bonus",
        }
    }
}

impl core::fmt::Display for XpEventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Narrator personas
// ---------------------------------------------------------------------------

/// One of the four fixed narrator personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Persona {
    /// Self-proclaimed mad scientist. The neutral default narrator.
    Okabe,
    /// Neuroscientist; dry, analytical, occasionally stern.
    Kurisu,
    /// Super hacker; casual and upbeat.
    Daru,
    /// Gentle and encouraging.
    Mayuri,
}

impl Persona {
    /// Every persona, in roster order.
    pub const ALL: [Self; 4] = [Self::Okabe, Self::Kurisu, Self::Daru, Self::Mayuri];

    /// The lowercase identifier used in persisted records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Okabe => "okabe",
            Self::Kurisu => "kurisu",
            Self::Daru => "daru",
            Self::Mayuri => "mayuri",
        }
    }
}

impl core::fmt::Display for Persona {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Narrative contexts
// ---------------------------------------------------------------------------

/// The situation a narrator is reacting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NarrativeContext {
    /// Session start.
    Greeting,
    /// A non-negative XP change was applied.
    Success,
    /// A negative XP change was applied.
    Failure,
    /// The derived level crossed a boundary upwards.
    LevelUp,
}

impl NarrativeContext {
    /// Every context, in declaration order.
    pub const ALL: [Self; 4] = [Self::Greeting, Self::Success, Self::Failure, Self::LevelUp];

    /// The lowercase label for this context.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::LevelUp => "levelup",
        }
    }

    /// Look up a context by label. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ctx| ctx.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl core::fmt::Display for NarrativeContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The situation a flavor quote is chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum QuoteContext {
    /// Start of the day.
    Morning,
    /// End of the day.
    Evening,
    /// General encouragement.
    Motivation,
    /// After a bad day.
    Setback,
}

impl QuoteContext {
    /// Every quote context, in declaration order.
    pub const ALL: [Self; 4] = [Self::Morning, Self::Evening, Self::Motivation, Self::Setback];

    /// The lowercase label for this context.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Motivation => "motivation",
            Self::Setback => "setback",
        }
    }

    /// Look up a context by label. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ctx| ctx.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

// ---------------------------------------------------------------------------
// Tracker enums
// ---------------------------------------------------------------------------

/// Task priority. Declaration order is sort order (high first).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TaskPriority {
    /// Urgent work.
    High,
    /// The default priority.
    #[default]
    Medium,
    /// Nice to have.
    Low,
}

/// The six-step mood scale recorded in daily logs, worst to best.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Mood {
    /// Crying.
    Devastated,
    /// Sad.
    Sad,
    /// Flat. The default for a new log.
    #[default]
    Neutral,
    /// Slightly smiling.
    Content,
    /// Smiling.
    Happy,
    /// Star-struck.
    Ecstatic,
}

impl Mood {
    /// Every mood, worst to best.
    pub const ALL: [Self; 6] = [
        Self::Devastated,
        Self::Sad,
        Self::Neutral,
        Self::Content,
        Self::Happy,
        Self::Ecstatic,
    ];

    /// The emoji shown by the daily log panel.
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Devastated => "\u{1f62d}",
            Self::Sad => "\u{1f622}",
            Self::Neutral => "\u{1f610}",
            Self::Content => "\u{1f642}",
            Self::Happy => "\u{1f60a}",
            Self::Ecstatic => "\u{1f929}",
        }
    }
}
