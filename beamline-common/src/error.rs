//! Error types for the beamline engine.

use thiserror::Error;

/// Errors raised by the physics pipeline before or while it runs.
///
/// Per-particle numeric edge cases (zero velocity, non-finite momenta) are
/// never reported here; stages handle them locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BeamlineError {
    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A sampling distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Convenience alias for `Result<T, BeamlineError>`.
pub type BeamlineResult<T> = Result<T, BeamlineError>;

impl BeamlineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BeamlineError::InvalidConfiguration(msg.into())
    }
}
