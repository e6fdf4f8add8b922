//! The XP ledger: an append-only log of every change to the XP total.
//!
//! # Design
//!
//! - **Single clamping point**: [`apply_delta`] is the only place the XP
//!   total is floored at zero.
//! - **Append-only**: entries are never modified, removed, or reordered.
//! - **Actual deltas**: each entry records the change that was applied, so
//!   the sum of entries always reconciles with the total. The requested
//!   delta is kept alongside for auditing.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use worldline_types::{XpEvent, XpEventId, XpEventType};

use crate::reconciliation::{
    ReconciliationResult, verify_reconciliation, verify_reconciliation_strict,
};

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// The outcome of applying a signed delta to an XP total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDelta {
    /// XP total before the change.
    pub previous_xp: u64,
    /// XP total after the change.
    pub new_xp: u64,
    /// The delta the caller asked for.
    pub requested: i64,
    /// The delta actually applied (`new_xp - previous_xp`).
    pub applied: i64,
}

impl AppliedDelta {
    /// Whether the result was clamped.
    pub const fn was_clamped(&self) -> bool {
        self.applied != self.requested
    }
}

/// Apply `delta` to `current`, flooring the result at zero.
///
/// `newXp = max(0, current + delta)`. The result also saturates at
/// `u64::MAX` on the way up.
pub fn apply_delta(current: u64, delta: i64) -> u64 {
    apply_delta_detailed(current, delta).new_xp
}

/// Apply `delta` to `current` and report both the requested and the actual
/// change.
pub fn apply_delta_detailed(current: u64, delta: i64) -> AppliedDelta {
    let new_xp = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs())
    };

    // |applied| <= |delta|, so it always fits back into an i64.
    let applied = i64::try_from(i128::from(new_xp).saturating_sub(i128::from(current)))
        .unwrap_or(delta);

    AppliedDelta {
        previous_xp: current,
        new_xp,
        requested: delta,
        applied,
    }
}

// ---------------------------------------------------------------------------
// XpLedger
// ---------------------------------------------------------------------------

/// Append-only history of XP changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XpLedger {
    /// All entries, in insertion order.
    entries: Vec<XpEvent>,
}

impl XpLedger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuild a ledger from persisted entries, preserving their order.
    pub const fn from_entries(entries: Vec<XpEvent>) -> Self {
        Self { entries }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pre-built entry.
    ///
    /// For new changes, prefer [`record`](Self::record), which computes the
    /// applied delta itself.
    pub fn append(&mut self, entry: XpEvent) {
        self.entries.push(entry);
    }

    /// Apply `requested` to `current_xp` and append one entry describing the
    /// change that was actually applied.
    pub fn record(
        &mut self,
        current_xp: u64,
        event_type: XpEventType,
        requested: i64,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> AppliedDelta {
        self.record_entry(current_xp, event_type, requested, reason, timestamp)
            .0
    }

    /// Like [`record`](Self::record), but also hands back a copy of the
    /// appended entry.
    pub fn record_entry(
        &mut self,
        current_xp: u64,
        event_type: XpEventType,
        requested: i64,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> (AppliedDelta, XpEvent) {
        let applied = apply_delta_detailed(current_xp, requested);
        let reason = reason.into();

        if applied.was_clamped() {
            tracing::debug!(
                event_type = %event_type,
                requested,
                applied = applied.applied,
                reason = %reason,
                "XP delta clamped at zero"
            );
        }

        let entry = XpEvent {
            id: XpEventId::new(),
            event_type,
            value: applied.applied,
            requested,
            reason,
            timestamp,
        };
        self.entries.push(entry.clone());

        (applied, entry)
    }

    /// The most recently appended entry.
    pub fn last(&self) -> Option<&XpEvent> {
        self.entries.last()
    }

    /// Return all entries, in insertion order.
    pub fn all_entries(&self) -> &[XpEvent] {
        &self.entries
    }

    /// Return up to `limit` entries, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<&XpEvent> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Sum of every applied delta in the ledger.
    pub fn net_change(&self) -> i128 {
        self.entries
            .iter()
            .fold(0_i128, |acc, e| acc.saturating_add(i128::from(e.value)))
    }

    /// Entries whose timestamp falls on `date` in the time zone `tz`.
    pub fn entries_for_day<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Vec<&XpEvent> {
        self.entries
            .iter()
            .filter(|e| e.timestamp.with_timezone(tz).date_naive() == date)
            .collect()
    }

    /// Net applied XP on `date` in the time zone `tz`.
    pub fn net_for_day<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> i64 {
        self.entries_for_day(date, tz)
            .into_iter()
            .fold(0_i64, |acc, e| acc.saturating_add(e.value))
    }

    /// Net applied XP per event type. Types with no entries are omitted.
    pub fn totals_by_type(&self) -> BTreeMap<XpEventType, i64> {
        let mut totals: BTreeMap<XpEventType, i64> = BTreeMap::new();
        for entry in &self.entries {
            let total = totals.entry(entry.event_type).or_insert(0);
            *total = total.saturating_add(entry.value);
        }
        totals
    }

    /// Verify that the recorded deltas explain the move from `opening_xp`
    /// to `closing_xp`.
    pub fn verify_reconciliation(&self, opening_xp: u64, closing_xp: u64) -> ReconciliationResult {
        verify_reconciliation(opening_xp, closing_xp, &self.entries)
    }

    /// Verify reconciliation and additionally replay every entry's
    /// requested delta through the clamp.
    pub fn verify_reconciliation_strict(
        &self,
        opening_xp: u64,
        closing_xp: u64,
    ) -> ReconciliationResult {
        verify_reconciliation_strict(opening_xp, closing_xp, &self.entries)
    }
}
