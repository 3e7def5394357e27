//! Error types for studyroom-core.
//!
//! Every fallible operation returns [`CoreError`]. Lifecycle precondition
//! failures have their own [`SessionError`] so callers can match on them
//! without string inspection.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Data directory could not be resolved or created.
    #[error("data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the slot store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot open database {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    QueryFailed(String),

    /// SQLITE_BUSY or SQLITE_LOCKED; another process holds the file.
    #[error("database is busy")]
    Locked,

    /// A slot value could not be encoded or decoded.
    #[error("slot '{key}' is not valid JSON for its type: {message}")]
    Serialize { key: String, message: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Session lifecycle precondition violations.
///
/// None of these leave the active-session slot modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session is already active for goal {goal_id}")]
    AlreadyActive { goal_id: String },

    #[error("no active session")]
    NoActiveSession,

    #[error("session is already paused")]
    AlreadyPaused,

    #[error("session is not paused")]
    NotPaused,

    #[error("unknown goal: {0}")]
    UnknownGoal(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("cannot write {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => StorageError::Locked,
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
