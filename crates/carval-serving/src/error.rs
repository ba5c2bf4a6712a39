//! Error types for the carval-serving crate.
//!
//! [`ServingError`] covers artifact loading and inference. [`RequestError`] is
//! what a single quote can fail with: either the input could not be encoded or
//! the scaler/model rejected it.

use carval_features::EncodingError;
use thiserror::Error;

/// Result type alias for serving operations.
pub type ServingResult<T> = Result<T, ServingError>;

/// Errors that can occur while loading artifacts or running inference.
#[derive(Debug, Error)]
pub enum ServingError {
    /// Model or scaler could not be loaded at startup.
    #[error("Failed to load artifact: {0}")]
    ArtifactLoadError(String),

    /// Scaler or model failed on a single request.
    #[error("Inference failed: {0}")]
    InferenceError(String),

    /// Input width does not match what the artifacts expect.
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Width the artifacts were trained on.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ServingError {
    /// Create an artifact load error.
    pub fn artifact_load(msg: impl Into<String>) -> Self {
        Self::ArtifactLoadError(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceError(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Check if this error must stop the process.
    ///
    /// Only startup failures are fatal; everything else is scoped to a single
    /// request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ArtifactLoadError(_) | Self::ConfigError(_))
    }
}

impl From<candle_core::Error> for ServingError {
    fn from(err: candle_core::Error) -> Self {
        ServingError::InferenceError(err.to_string())
    }
}

/// Failure of a single quote request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The raw input could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Scaling or inference failed.
    #[error(transparent)]
    Serving(#[from] ServingError),
}

impl RequestError {
    /// Check if the user can fix this by changing the input.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Encoding(err) => err.is_input_error(),
            Self::Serving(_) => false,
        }
    }
}
