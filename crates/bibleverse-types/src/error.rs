//! Error types for loading the static verse resources

use thiserror::Error;

/// Result type for resource loading
pub type Result<T> = std::result::Result<T, VerseError>;

/// Errors raised while loading or validating the fallback table
#[derive(Debug, Error)]
pub enum VerseError {
    /// The fallback resource could not be read from disk
    #[error("Failed to read fallback table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The fallback resource is not valid JSON or has unknown situation keys
    #[error("Invalid fallback table: {0}")]
    Parse(#[from] serde_json::Error),

    /// The fallback resource has no entry for the default situation
    #[error("Fallback table has no entry for default situation '{0}'")]
    MissingDefault(String),

    /// An entry in the fallback resource is not a usable verse
    #[error("Fallback entry '{situation}' is invalid: {reason}")]
    InvalidEntry { situation: String, reason: String },
}
