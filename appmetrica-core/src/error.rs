//! Error types for appmetrica-core

use thiserror::Error;

/// Main error type for the appmetrica-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed event record in an input file
    #[error("invalid event record on line {line}: {message}")]
    Record { line: usize, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Error reported by the AppMetrica API
    #[error("[{code}] {message}")]
    Api { code: i64, message: String },

    /// Transport-level failure talking to the API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The importer was misused before being handed to the client
    #[error("importer error: {0}")]
    Importer(#[from] ImporterError),
}

/// Configuration misuse recorded by an [`EventImporter`](crate::importer::EventImporter).
///
/// These are never returned from the call that caused them. The importer keeps
/// the first one and exposes it through `EventImporter::error`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImporterError {
    #[error("failed to add event(s) to completed importer")]
    EnqueueAfterFinish,

    #[error("failed to set identifier mode after output has started")]
    IdentifierModeLocked,

    #[error("failed to set columns after output has started")]
    ColumnsLocked,
}

impl Error {
    /// Build an API error from a status or envelope code and message.
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Error::Api {
            code,
            message: message.into(),
        }
    }
}

/// Result type alias for appmetrica-core
pub type Result<T> = std::result::Result<T, Error>;
