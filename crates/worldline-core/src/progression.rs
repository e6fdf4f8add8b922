//! The progression controller.
//!
//! The single entry point for XP-affecting events. One call:
//!
//! 1. applies the requested delta through the ledger clamp,
//! 2. appends one ledger entry carrying the actually applied delta,
//! 3. shifts divergence by the configured policy and records a worldline
//!    reading when it moved,
//! 4. derives the level before and after,
//! 5. picks `success` (applied >= 0) or `failure` feedback, plus a level-up
//!    message when a boundary was crossed,
//! 6. stamps `last_active`.
//!
//! The controller never mutates the snapshot it is given. It returns the
//! next snapshot inside an [`EventOutcome`]; the caller swaps it in whole.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use worldline_agents::{AgentMessage, Narrator};
use worldline_ledger::{AppliedDelta, LevelCurve, XpLedger};
use worldline_tracker::XpReport;
use worldline_types::{
    GameState, NarrativeContext, WorldlineEntry, WorldlineEntryId, XpEvent, XpEventType,
};

use crate::config::{ConfigError, LabConfig};
use crate::worldline::worldline_of;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// A raw gameplay event: "this happened, worth this much XP".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Source of the change.
    pub kind: XpEventType,
    /// Requested signed XP change.
    pub delta: i64,
    /// Label for the ledger entry.
    pub reason: String,
}

impl GameEvent {
    /// Build an event.
    pub fn new(kind: XpEventType, delta: i64, reason: impl Into<String>) -> Self {
        Self {
            kind,
            delta,
            reason: reason.into(),
        }
    }
}

impl From<XpReport> for GameEvent {
    fn from(report: XpReport) -> Self {
        Self {
            kind: report.event_type,
            delta: report.delta,
            reason: report.reason,
        }
    }
}

/// Everything produced by one [`ProgressionController::record_event`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    /// The next snapshot.
    pub state: GameState,
    /// Requested versus applied XP change.
    pub applied: AppliedDelta,
    /// The ledger entry that was appended.
    pub event: XpEvent,
    /// The worldline reading recorded, if divergence moved.
    pub worldline_entry: Option<WorldlineEntry>,
    /// Level before the event.
    pub previous_level: u32,
    /// Level after the event.
    pub level: u32,
    /// Which context the feedback was chosen for.
    pub context: NarrativeContext,
    /// Narrator reaction to the XP change.
    pub feedback: AgentMessage,
    /// Extra narrator reaction when a level boundary was crossed upwards.
    pub level_up_feedback: Option<AgentMessage>,
}

impl EventOutcome {
    /// Whether the level went up.
    pub const fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// How divergence reacts to XP changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergencePolicy {
    /// Added when the applied delta is positive.
    pub success_shift: i64,
    /// Added when the applied delta is negative.
    pub failure_shift: i64,
}

impl Default for DivergencePolicy {
    fn default() -> Self {
        Self {
            success_shift: 1,
            failure_shift: -1,
        }
    }
}

impl DivergencePolicy {
    /// The divergence change for an applied XP delta. Zero leaves it alone.
    pub const fn shift_for(&self, applied: i64) -> i64 {
        if applied > 0 {
            self.success_shift
        } else if applied < 0 {
            self.failure_shift
        } else {
            0
        }
    }
}

/// Feedback context for an applied delta.
pub const fn context_for(applied: i64) -> NarrativeContext {
    if applied >= 0 {
        NarrativeContext::Success
    } else {
        NarrativeContext::Failure
    }
}

/// `state` with the global streak moved by `delta`, floored at zero.
pub fn with_streak_delta(state: &GameState, delta: i8) -> GameState {
    let magnitude = u32::from(delta.unsigned_abs());
    let streak = if delta.is_negative() {
        state.streak.saturating_sub(magnitude)
    } else {
        state.streak.saturating_add(magnitude)
    };
    GameState {
        streak,
        ..state.clone()
    }
}

// ---------------------------------------------------------------------------
// ProgressionController
// ---------------------------------------------------------------------------

/// Composes the ledger, level curve, divergence policy, and narrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressionController {
    /// XP to level mapping.
    curve: LevelCurve,
    /// Divergence reaction.
    policy: DivergencePolicy,
    /// Feedback selection.
    narrator: Narrator,
}

impl ProgressionController {
    /// Create a controller.
    pub const fn new(curve: LevelCurve, policy: DivergencePolicy, narrator: Narrator) -> Self {
        Self {
            curve,
            policy,
            narrator,
        }
    }

    /// Build a controller from the `progression` and `dialogue` sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero level step or an all-zero weight
    /// table.
    pub fn from_config(config: &LabConfig) -> Result<Self, ConfigError> {
        let curve = config.progression.level_curve()?;
        let policy = DivergencePolicy {
            success_shift: config.progression.success_shift,
            failure_shift: config.progression.failure_shift,
        };
        let narrator = Narrator::new(config.dialogue.selector()?);
        Ok(Self::new(curve, policy, narrator))
    }

    /// The level curve.
    pub const fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    /// The narrator.
    pub const fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Session-start greeting.
    pub fn greet(&self, rng: &mut impl Rng) -> AgentMessage {
        self.narrator.speak(NarrativeContext::Greeting, rng)
    }

    /// Apply `event` to `state`, appending exactly one entry to `ledger`.
    pub fn record_event(
        &self,
        state: &GameState,
        ledger: &mut XpLedger,
        event: GameEvent,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> EventOutcome {
        let GameEvent {
            kind,
            delta,
            reason,
        } = event;

        let previous_level = self.curve.level_of(state.xp);
        let (applied, event) = ledger.record_entry(state.xp, kind, delta, reason.clone(), now);
        let level = self.curve.level_of(applied.new_xp);

        let shift = self.policy.shift_for(applied.applied);
        let divergence = state.divergence.saturating_add(shift);
        let worldline_entry = (divergence != state.divergence).then(|| WorldlineEntry {
            id: WorldlineEntryId::new(),
            value: worldline_of(divergence).to_string(),
            divergence,
            event: reason,
            timestamp: now,
        });

        let context = context_for(applied.applied);
        let feedback = self.narrator.speak(context, rng);
        let level_up_feedback = (level > previous_level)
            .then(|| self.narrator.speak(NarrativeContext::LevelUp, rng));

        if level > previous_level {
            tracing::info!(
                previous_level,
                level,
                xp = applied.new_xp,
                "level up"
            );
        }
        tracing::debug!(
            kind = %kind,
            requested = applied.requested,
            applied = applied.applied,
            xp = applied.new_xp,
            divergence,
            "event recorded"
        );

        EventOutcome {
            state: GameState {
                xp: applied.new_xp,
                streak: state.streak,
                divergence,
                last_active: Some(now),
            },
            applied,
            event,
            worldline_entry,
            previous_level,
            level,
            context,
            feedback,
            level_up_feedback,
        }
    }
}
