//! Shared type definitions for the Worldline progression engine.
//!
//! This crate is the single source of truth for every record the engine
//! reads, writes, and persists. Types flow downstream to `TypeScript` via
//! `ts-rs` for the dashboard front-end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for record identifiers
//! - [`enums`] -- Event types, narrator personas, contexts, priorities, moods
//! - [`structs`] -- The progression snapshot, history records, tracker records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Mood, NarrativeContext, Persona, QuoteContext, TaskPriority, XpEventType};
pub use ids::{HabitId, StudySessionId, TaskId, WorldlineEntryId, XpEventId};
pub use structs::{DailyLog, GameState, Habit, StudySession, Task, WorldlineEntry, XpEvent};
