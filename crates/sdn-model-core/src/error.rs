// ── Core error types ──
//
// Every failure the model core can report. Callers match on the variant;
// the core itself never retries.

use thiserror::Error;

/// Unified error type for the model core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    // ── Precondition errors ──────────────────────────────────────────
    /// Malformed identity strings, empty or broken link chains and the like.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The value exists but is not of the kind the caller asked for.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    // ── Projection errors ────────────────────────────────────────────
    #[error("Capability {capability} is not supported by {entity}")]
    UnsupportedCapability { capability: String, entity: String },

    #[error("{component} is not ready")]
    NotReady { component: String },
}

impl ModelError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(capability: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            capability: capability.into(),
            entity: entity.into(),
        }
    }
}
