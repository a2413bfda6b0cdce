//! Error types for the key trial runner.
//!
//! Only failures that abort the whole run are errors: a broken
//! configuration or an unusable key file. A single key failing to
//! activate is an ordinary outcome and never surfaces here.

/// Errors that abort a trial run.
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Key file '{0}' not found")]
    KeyFileMissing(String),

    #[error("Failed to read key file '{path}': {source}")]
    KeyFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for trial operations.
pub type TrialResult<T> = Result<T, TrialError>;
