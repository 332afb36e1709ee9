//! Error types for carddet.

use thiserror::Error;

/// Result alias for carddet operations.
pub type DetectResult<T> = std::result::Result<T, DetectError>;

/// Errors that can occur when post-processing detector outputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    /// A tensor length is inconsistent with the prior grid.
    #[error("shape mismatch in {context}: expected {expected} values, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    /// The prior configuration is rejected before any computation.
    #[error("invalid prior config: {reason}")]
    InvalidConfig { reason: &'static str },
}
