//! Error types for tt
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown id)
//! - 3: Blocked by schedule (window overlaps an existing scheduled item)
//! - 4: Operation failed (io error, malformed data file)

use std::path::PathBuf;
use thiserror::Error;

use crate::model::TaskKind;

/// Exit codes for the tt CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const SCHEDULE_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tt operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No {kind} with id {id}")]
    NotFound { kind: TaskKind, id: u32 },

    // Schedule blocks (exit code 3)
    #[error("Scheduling window {start} (+{minutes}m) overlaps an existing scheduled item")]
    ScheduleConflict { start: String, minutes: i64 },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Malformed data file row: {0}")]
    Csv(String),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_) | Error::NotFound { .. } => exit_codes::USER_ERROR,

            // Schedule blocks
            Error::ScheduleConflict { .. } => exit_codes::SCHEDULE_BLOCKED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::Csv(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    pub(crate) fn not_found(kind: TaskKind, id: u32) -> Self {
        Error::NotFound { kind, id }
    }
}

/// Result type alias for tt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: None,
        }
    }
}
