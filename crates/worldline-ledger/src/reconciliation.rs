//! Reconciliation of the XP ledger against the XP total.
//!
//! The ledger records the delta that was actually applied for every change,
//! so for any epoch:
//!
//! ```text
//! closing_xp == opening_xp + sum(entry.value)
//! ```
//!
//! This holds by construction when every change goes through
//! [`XpLedger::record`](crate::XpLedger::record). The check exists to catch
//! hand-edited or partially persisted histories.

use worldline_types::XpEvent;

use crate::LedgerAnomaly;
use crate::ledger::apply_delta_detailed;

/// The result of a reconciliation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationResult {
    /// The recorded deltas explain the total.
    Balanced,
    /// The recorded deltas and the total disagree.
    Anomaly(LedgerAnomaly),
}

impl ReconciliationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify that `opening_xp` plus the recorded deltas equals `closing_xp`.
pub fn verify_reconciliation(
    opening_xp: u64,
    closing_xp: u64,
    entries: &[XpEvent],
) -> ReconciliationResult {
    let mut recorded_net: i128 = 0;
    for entry in entries {
        recorded_net = match recorded_net.checked_add(i128::from(entry.value)) {
            Some(val) => val,
            None => return overflow_anomaly(opening_xp, closing_xp),
        };
    }

    let expected = i128::from(opening_xp).checked_add(recorded_net);
    if expected == Some(i128::from(closing_xp)) {
        ReconciliationResult::Balanced
    } else {
        ReconciliationResult::Anomaly(LedgerAnomaly {
            opening_xp,
            closing_xp,
            recorded_net,
            offending_entry: None,
            message: format!(
                "XP_LEDGER_ANOMALY: opening {opening_xp} + recorded {recorded_net} != closing {closing_xp}",
            ),
        })
    }
}

/// Verify reconciliation and replay every entry through the clamp.
///
/// Starting from `opening_xp`, each entry's `requested` delta is re-applied;
/// the resulting change must match the entry's recorded `value`. The first
/// mismatch is reported as the offending entry.
pub fn verify_reconciliation_strict(
    opening_xp: u64,
    closing_xp: u64,
    entries: &[XpEvent],
) -> ReconciliationResult {
    let result = verify_reconciliation(opening_xp, closing_xp, entries);
    let ReconciliationResult::Anomaly(_) = &result else {
        let mut running = opening_xp;
        for entry in entries {
            let replay = apply_delta_detailed(running, entry.requested);
            if replay.applied != entry.value {
                return ReconciliationResult::Anomaly(LedgerAnomaly {
                    opening_xp,
                    closing_xp,
                    recorded_net: i128::from(closing_xp).saturating_sub(i128::from(opening_xp)),
                    offending_entry: Some(entry.id),
                    message: format!(
                        "XP_LEDGER_ANOMALY: entry {} recorded {} but replay applies {}",
                        entry.id, entry.value, replay.applied
                    ),
                });
            }
            running = replay.new_xp;
        }
        return ReconciliationResult::Balanced;
    };
    result
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(opening_xp: u64, closing_xp: u64) -> ReconciliationResult {
    ReconciliationResult::Anomaly(LedgerAnomaly {
        opening_xp,
        closing_xp,
        recorded_net: 0,
        offending_entry: None,
        message: "XP_LEDGER_ANOMALY: arithmetic overflow while summing entries".to_owned(),
    })
}
