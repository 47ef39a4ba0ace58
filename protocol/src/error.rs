//! Error types for the protocol layer

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Offending request fields (wire names)
    pub fields: Vec<String>,
    /// Human-readable message, surfaced verbatim to the caller
    pub message: String,
}

impl ValidationError {
    /// Validation error on a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![field.to_string()],
            message: message.into(),
        }
    }

    /// Validation error naming several missing fields
    pub fn missing(fields: Vec<String>) -> Self {
        let message = format!("Missing required fields: {}.", fields.join(", "));
        Self { fields, message }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Protocol errors
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Gateway body did not match any known V1/V2 shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Unknown schema version label
    #[error("Unknown schema version: {0}")]
    UnknownVersion(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
