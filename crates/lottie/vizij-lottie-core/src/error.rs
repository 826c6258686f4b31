//! Error types shared by engine implementations.
//!
//! The adapter never wraps engine errors: `Adapter::attach` hands back whatever
//! `PlayerEngine::Error` the engine produced. `EngineError` is the error type the
//! bundled engines use.

use serde::{Deserialize, Serialize};

/// Errors an engine may report while constructing an instance.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EngineError {
    /// Payload is missing or not a document the engine understands
    #[error("Invalid animation payload: {reason}")]
    InvalidPayload { reason: String },

    /// Render target is missing or not mounted
    #[error("Render target unavailable: {reason}")]
    MissingTarget { reason: String },

    /// Options or payload failed to (de)serialize
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Anything else the engine threw
    #[error("Engine error: {message}")]
    Generic { message: String },
}

impl EngineError {
    /// Create a new generic error
    pub fn new(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "payload",
            Self::MissingTarget { .. } => "target",
            Self::Serialization { .. } => "serialization",
            Self::Generic { .. } => "generic",
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
