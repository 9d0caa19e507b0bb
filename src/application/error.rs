//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::TreeError;

/// Application errors wrap domain errors and add script and settings context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] TreeError),

    #[error("line {line}: cannot parse '{content}'")]
    Parse { line: usize, content: String },

    #[error("line {line}: invalid key '{key}': {reason}")]
    InvalidKey {
        line: usize,
        key: String,
        reason: String,
    },

    #[error("script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
