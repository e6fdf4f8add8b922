//! Narrator selection, dialogue, and flavor quotes for the Worldline engine.
//!
//! This crate is the presentation-feedback layer. It never validates
//! anything: unknown context labels fall back to the neutral narrator and a
//! generic line instead of failing.
//!
//! # Modules
//!
//! - [`dialogue`] -- Per-(persona, context) line pools and the [`Narrator`]
//! - [`error`] -- Weight table validation errors ([`SelectorError`])
//! - [`persona`] -- Display name, colour tag, and emoji per persona
//! - [`quotes`] -- Context-keyed flavor quotes
//! - [`selector`] -- Weighted-random persona selection ([`AgentSelector`])
//!
//! All randomness is injected as `&mut impl rand::Rng`, so tests pass a
//! seeded `SmallRng` and assert exact output.

pub mod dialogue;
pub mod error;
pub mod persona;
pub mod quotes;
pub mod selector;

pub use dialogue::{AgentMessage, GENERIC_LINE, Narrator, generate_message, lines_for};
pub use error::SelectorError;
pub use persona::{PersonaProfile, profile};
pub use quotes::{DEFAULT_QUOTE, quote_for, quote_for_label, quote_of_the_day, quotes_for};
pub use selector::{AgentSelector, AgentWeights, ContextWeights, DEFAULT_PERSONA};
