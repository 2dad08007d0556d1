//! Error types for the library layer.

use thiserror::Error;

/// Message shown to users whenever report data cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load report data. Please try again.";

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding serialization, file, and input validation failures.
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// An error from the underlying API client.
    #[error("API error: {0}")]
    Api(#[from] issuance_api::Error),
    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A local data file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// User-provided input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IssuanceError {
    /// The single user-facing message for this failure. Details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => format!("Invalid input: {}", msg),
            _ => LOAD_FAILED_MESSAGE.to_string(),
        }
    }
}
