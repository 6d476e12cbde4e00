/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 14/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use std::path::PathBuf;
use thiserror::Error;

/// Error type for every Shapefile reading operation.
#[derive(Debug, Error)]
pub enum ShapefileError {
    /// A required input was empty or out of range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// A field did not hold the value the format requires.
    #[error("format error in {field}: expected {expected}, found {actual}")]
    FieldMismatch {
        /// Name of the offending field.
        field: String,
        /// What the format requires.
        expected: String,
        /// What the file contains.
        actual: String,
    },

    /// Malformed or truncated data.
    #[error("format error: {message}")]
    Format {
        /// Error message.
        message: String,
    },

    /// A required companion file is missing.
    #[error("{description} not found: {}", path.display())]
    NotFound {
        /// Which file was looked for.
        description: String,
        /// Where it was looked for.
        path: PathBuf,
    },

    /// The operation is not valid in the current state.
    #[error("invalid state: {message}")]
    State {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShapefileError {
    /// Creates an invalid argument error with the given message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a format error with the given message.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Creates a format error naming the field and its expected and actual values.
    pub fn field_mismatch(
        field: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::FieldMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates a state error with the given message.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// True for the two format variants.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::FieldMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ShapefileError>;
