use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single request execution. No variant carries a partial response.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Request failed: {source}")]
    NetworkFailure {
        #[source]
        source: reqwest::Error,
    },

    /// The response head arrived but the body did not. A timeout that expires
    /// mid-body lands here, with [`ExecutionError::is_timeout`] set.
    #[error("Failed to read response: {source}")]
    BodyReadFailure {
        #[source]
        source: reqwest::Error,
    },
}

impl ExecutionError {
    /// True when the configured overall timeout expired.
    pub fn is_timeout(&self) -> bool {
        match self {
            ExecutionError::NetworkFailure { source } | ExecutionError::BodyReadFailure { source } => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}

/// Failures reading or writing a persisted record.
///
/// A missing record is never an error; a record that exists but does not parse is.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record `{}`: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Lookup failures of the caller-side collection operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Request `{request_id}` not found in collection `{collection_id}`")]
    RequestNotFound {
        collection_id: String,
        request_id: String,
    },
}

/// Errors from store-backed collection operations.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImportError {
    #[error("Command must start with 'curl'")]
    NotCurl,

    #[error("Could not parse URL from curl command")]
    MissingUrl,

    #[error("Unterminated quote in curl command")]
    UnterminatedQuote,

    #[error("Option `{0}` expects a value")]
    MissingValue(String),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
pub type StorageResult<T> = Result<T, StorageError>;
