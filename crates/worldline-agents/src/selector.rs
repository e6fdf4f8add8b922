//! Weighted-random persona selection per narrative context.
//!
//! Each context carries an integer weight per persona. A persona's chance of
//! being picked is its weight divided by the context total, so every
//! distribution sums to 1 by construction. The defaults favour cheerful
//! narrators on success and Kurisu's dry caution on failure, while keeping
//! every persona reachable in every context.

use rand::Rng;
use serde::{Deserialize, Serialize};

use worldline_types::{NarrativeContext, Persona};

use crate::error::SelectorError;

/// The neutral narrator used when a context label is not recognised.
pub const DEFAULT_PERSONA: Persona = Persona::Okabe;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Relative selection weight of each persona within one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentWeights {
    /// Weight of [`Persona::Okabe`].
    pub okabe: u32,
    /// Weight of [`Persona::Kurisu`].
    pub kurisu: u32,
    /// Weight of [`Persona::Daru`].
    pub daru: u32,
    /// Weight of [`Persona::Mayuri`].
    pub mayuri: u32,
}

impl AgentWeights {
    /// Weights in persona roster order.
    pub const fn new(okabe: u32, kurisu: u32, daru: u32, mayuri: u32) -> Self {
        Self {
            okabe,
            kurisu,
            daru,
            mayuri,
        }
    }

    /// The weight of `persona`.
    pub const fn weight(&self, persona: Persona) -> u32 {
        match persona {
            Persona::Okabe => self.okabe,
            Persona::Kurisu => self.kurisu,
            Persona::Daru => self.daru,
            Persona::Mayuri => self.mayuri,
        }
    }

    /// Sum of all four weights.
    pub fn total(&self) -> u64 {
        Persona::ALL
            .into_iter()
            .fold(0_u64, |acc, p| acc.saturating_add(u64::from(self.weight(p))))
    }
}

/// Weight tables for every narrative context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWeights {
    /// Session start.
    #[serde(default = "default_greeting")]
    pub greeting: AgentWeights,
    /// Non-negative XP change.
    #[serde(default = "default_success")]
    pub success: AgentWeights,
    /// Negative XP change.
    #[serde(default = "default_failure")]
    pub failure: AgentWeights,
    /// Level boundary crossed upwards.
    #[serde(default = "default_level_up")]
    pub levelup: AgentWeights,
}

impl ContextWeights {
    /// The table for `context`.
    pub const fn for_context(&self, context: NarrativeContext) -> &AgentWeights {
        match context {
            NarrativeContext::Greeting => &self.greeting,
            NarrativeContext::Success => &self.success,
            NarrativeContext::Failure => &self.failure,
            NarrativeContext::LevelUp => &self.levelup,
        }
    }
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            success: default_success(),
            failure: default_failure(),
            levelup: default_level_up(),
        }
    }
}

const fn default_greeting() -> AgentWeights {
    AgentWeights::new(40, 20, 20, 20)
}

const fn default_success() -> AgentWeights {
    AgentWeights::new(25, 20, 25, 30)
}

const fn default_failure() -> AgentWeights {
    AgentWeights::new(20, 45, 15, 20)
}

const fn default_level_up() -> AgentWeights {
    AgentWeights::new(35, 20, 25, 20)
}

// ---------------------------------------------------------------------------
// AgentSelector
// ---------------------------------------------------------------------------

/// Picks the narrator for a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSelector {
    /// Validated weight tables.
    weights: ContextWeights,
}

impl AgentSelector {
    /// Build a selector, rejecting any context whose weights are all zero.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::AllZero`] naming the first empty context.
    pub fn new(weights: ContextWeights) -> Result<Self, SelectorError> {
        for context in NarrativeContext::ALL {
            if weights.for_context(context).total() == 0 {
                return Err(SelectorError::AllZero { context });
            }
        }
        Ok(Self { weights })
    }

    /// The weight tables in use.
    pub const fn weights(&self) -> &ContextWeights {
        &self.weights
    }

    /// Pick a persona for `context` by weighted roll.
    pub fn select(&self, context: NarrativeContext, rng: &mut impl Rng) -> Persona {
        let weights = self.weights.for_context(context);
        let total = weights.total();
        if total == 0 {
            return DEFAULT_PERSONA;
        }

        let mut roll: u64 = rng.random_range(0..total);
        for persona in Persona::ALL {
            let weight = u64::from(weights.weight(persona));
            if roll < weight {
                return persona;
            }
            roll = roll.saturating_sub(weight);
        }

        DEFAULT_PERSONA
    }

    /// Pick a persona for a context given by label.
    ///
    /// Unknown labels select [`DEFAULT_PERSONA`] without consuming
    /// randomness.
    pub fn select_label(&self, label: &str, rng: &mut impl Rng) -> Persona {
        NarrativeContext::from_label(label).map_or_else(
            || {
                tracing::debug!(label, "unknown narrative context, using default narrator");
                DEFAULT_PERSONA
            },
            |context| self.select(context, rng),
        )
    }
}
