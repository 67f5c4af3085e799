/*! Error types for Tacto operations. */

use super::ElementId;

/// Errors that can occur during Tacto operations.
#[derive(Debug, thiserror::Error)]
pub enum TactoError {
  #[error("Element label is empty")]
  EmptyLabel,

  #[error("Invalid element size {w}x{h}: both dimensions must be positive and finite")]
  InvalidBounds { w: f64, h: f64 },

  #[error("Element not found: {0}")]
  ElementNotFound(ElementId),

  #[error("Speech failed: {0}")]
  SpeechFailed(String),

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),
}

/// Result type for Tacto operations.
pub type TactoResult<T> = Result<T, TactoError>;
