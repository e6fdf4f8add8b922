//! Error types for the worldline-agents crate.

use worldline_types::NarrativeContext;

/// Errors raised when building an [`AgentSelector`](crate::AgentSelector)
/// from configured weights.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Every persona has weight zero for this context, so nobody could be
    /// selected.
    #[error("agent weights for context '{context}' are all zero")]
    AllZero {
        /// The context with the empty distribution.
        context: NarrativeContext,
    },
}
