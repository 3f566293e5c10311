//! Shared primitives for all Rust crates in the GREGoR access auditor.

#![forbid(unsafe_code)]

/// Strongly-typed identifiers for persisted records.
pub mod ids;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ids::{ManagedGroupId, ResearchCenterId, UploadCycleId, WorkspaceId};

/// Result type used across the auditor crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation conflicts with the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The remote access-control API rejected or failed a call.
    #[error("remote api error (status {status}): {message}")]
    RemoteApi {
        /// HTTP status code, or 0 when no response was received.
        status: u16,
        /// Response body excerpt or transport error.
        message: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
