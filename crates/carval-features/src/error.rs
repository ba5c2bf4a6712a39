//! Error types for the carval-features crate.

use thiserror::Error;

use crate::schema::{CategoricalGroup, NumericField};

/// Result type alias for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Errors raised while building a feature schema or encoding raw input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// A numeric field could not be parsed as a finite number.
    #[error("Invalid value for {field}: {input:?} is not a finite number")]
    InvalidNumericField {
        /// The field that failed to parse.
        field: NumericField,
        /// The raw text that was supplied.
        input: String,
    },

    /// A categorical selection does not map to any column in the schema.
    #[error("Unknown {group} {value:?}: column {column:?} is not part of the feature schema")]
    UnknownCategory {
        /// The categorical group the selection belongs to.
        group: CategoricalGroup,
        /// The trimmed selection text.
        value: String,
        /// The derived indicator column name.
        column: String,
    },

    /// The schema itself is malformed.
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl EncodingError {
    /// Create a schema mismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Check if the error was caused by user-supplied input rather than the schema.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidNumericField { .. } | Self::UnknownCategory { .. }
        )
    }
}
