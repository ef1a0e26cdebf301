//! Structured error types for user-facing failures.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Account errors
    EmailInUse,
    InvalidCredentials,

    // Not found errors
    TaskNotFound,

    // Internal errors
    StorageFailure,
}

/// Failure of the session-scoped key-value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Structured error shown next to a form or returned from a store operation.
#[derive(Debug, Serialize)]
pub struct JoinError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl JoinError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn email_in_use() -> Self {
        Self::new(ErrorCode::EmailInUse, "This email is already in use").with_field("email")
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorCode::InvalidCredentials,
            "Check your email and password. Please try again.",
        )
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {}", task_id))
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StorageFailure, err.to_string())
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for JoinError {}

impl From<StorageError> for JoinError {
    fn from(err: StorageError) -> Self {
        JoinError::storage(err)
    }
}

/// Result type for store and board operations.
pub type JoinResult<T> = std::result::Result<T, JoinError>;
