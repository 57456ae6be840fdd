//! Error types for the view engine.

use thiserror::Error;

/// Errors that can occur while ingesting engine data into the view layer.
///
/// None of these are fatal. The [`Session`](crate::Session) recovers from
/// every variant locally and keeps its last-good state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ViewError {
    /// Engine unreachable, or its reply could not be decoded.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// A trace or distribution does not have the expected shape.
    #[error("Shape mismatch{}: {reason}", format_step_context(.step))]
    ShapeMismatch {
        /// Index of the offending step, if the mismatch is step-local.
        step: Option<usize>,
        /// What was wrong.
        reason: String,
    },

    /// An outcome key on the wire was not a non-negative integer.
    #[error("Invalid outcome key '{0}'")]
    InvalidOutcome(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ViewError {
    /// Shorthand for a trace-level shape mismatch.
    pub fn shape(reason: impl Into<String>) -> Self {
        ViewError::ShapeMismatch {
            step: None,
            reason: reason.into(),
        }
    }

    /// Shorthand for a step-level shape mismatch.
    pub fn step_shape(step: usize, reason: impl Into<String>) -> Self {
        ViewError::ShapeMismatch {
            step: Some(step),
            reason: reason.into(),
        }
    }

    /// Whether the incoming data was rejected for its content rather than
    /// lost in transit.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ViewError::ShapeMismatch { .. } | ViewError::InvalidOutcome(_)
        )
    }
}

#[allow(clippy::ref_option)]
fn format_step_context(step: &Option<usize>) -> String {
    match step {
        Some(index) => format!(" at step {index}"),
        None => String::new(),
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(e: serde_json::Error) -> Self {
        ViewError::Transport(format!("malformed reply: {e}"))
    }
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
