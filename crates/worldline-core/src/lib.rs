//! Worldline generation, event progression, and the lab session.
//!
//! This crate composes the leaf crates into a working engine: raw gameplay
//! events go in through the [`ProgressionController`], which updates the
//! ledger, shifts divergence, and picks narrator feedback. [`Lab`] wraps the
//! controller with the tracker collections and a [`RecordStore`].
//!
//! # Modules
//!
//! - [`clock`] -- Injectable time source ([`Clock`], [`ManualClock`])
//! - [`config`] -- Configuration loading from `worldline-config.yaml`
//! - [`lab`] -- The session facade with best-effort persistence
//! - [`progression`] -- The single entry point for XP-affecting events
//! - [`telemetry`] -- Tracing subscriber setup
//! - [`ticker`] -- Cancellable once-per-period display ticks
//! - [`views`] -- Dashboard, XP log, and worldline history views
//! - [`worldline`] -- Divergence to worldline readings, and proximity
//!
//! [`RecordStore`]: worldline_db::RecordStore

pub mod clock;
pub mod config;
pub mod lab;
pub mod progression;
pub mod telemetry;
pub mod ticker;
pub mod views;
pub mod worldline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LabConfig};
pub use lab::{Lab, LabError, SaveReport, Tracked};
pub use progression::{DivergencePolicy, EventOutcome, GameEvent, ProgressionController};
pub use ticker::Ticker;
pub use views::{Dashboard, WorldlineHistoryView, XpLogView};
pub use worldline::{ReferenceWorldline, STEINS_GATE, Worldline, proximity, worldline_of};
