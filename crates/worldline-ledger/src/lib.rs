//! Level curve and append-only XP ledger for the Worldline progression engine.
//!
//! Every XP change in the system flows through this crate. The total is
//! clamped at zero in exactly one place ([`apply_delta`]) and every change is
//! recorded as an [`XpEvent`](worldline_types::XpEvent) carrying the delta
//! that was actually applied.
//!
//! # Modules
//!
//! - [`level`] -- The [`LevelCurve`]: XP to level, level to threshold, progress.
//! - [`ledger`] -- The [`XpLedger`]: append-only event log and queries.
//! - [`reconciliation`] -- Checks that recorded deltas explain the XP total.
//!
//! # Reconciliation Law
//!
//! For any epoch starting at `opening_xp`:
//!
//! ```text
//! closing_xp == opening_xp + sum(event.value for events in epoch)
//! ```
//!
//! # Usage
//!
//! ```
//! use chrono::Utc;
//! use worldline_ledger::{LevelCurve, XpLedger, ReconciliationResult};
//! use worldline_types::XpEventType;
//!
//! let curve = LevelCurve::default();
//! let mut ledger = XpLedger::new();
//!
//! let applied = ledger.record(5, XpEventType::Habit, -10, "Morning run", Utc::now());
//! assert_eq!(applied.new_xp, 0);
//! assert_eq!(applied.applied, -5);
//!
//! assert_eq!(curve.level_of(applied.new_xp), 1);
//! assert_eq!(ledger.verify_reconciliation(5, 0), ReconciliationResult::Balanced);
//! ```

pub mod ledger;
pub mod level;
pub mod reconciliation;

// Re-export primary types at crate root.
pub use ledger::{AppliedDelta, XpLedger, apply_delta, apply_delta_detailed};
pub use level::{DEFAULT_LEVEL_STEP, LevelCurve, LevelProgress};
pub use reconciliation::ReconciliationResult;

use worldline_types::XpEventId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when constructing a level curve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// A zero step would make every level span empty.
    #[error("level step must be at least 1")]
    ZeroStep,
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A reconciliation failure: the recorded deltas do not explain the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// XP total at the start of the checked epoch.
    pub opening_xp: u64,
    /// XP total at the end of the checked epoch.
    pub closing_xp: u64,
    /// Sum of the applied deltas recorded in the epoch.
    pub recorded_net: i128,
    /// The first entry whose value disagrees with a replay, if the strict
    /// check found one.
    pub offending_entry: Option<XpEventId>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
