use std::path::PathBuf;

use shared::protocol::DirectoryOperation;
use thiserror::Error;

/// Any failure to complete a call against the remote user directory.
#[derive(Debug, Error)]
#[error("{operation} failed: {failure}")]
pub struct TransportError {
    pub operation: DirectoryOperation,
    pub failure: TransportFailure,
}

impl TransportError {
    pub fn new(operation: DirectoryOperation, failure: TransportFailure) -> Self {
        Self { operation, failure }
    }

    pub fn unavailable(operation: DirectoryOperation) -> Self {
        Self::new(operation, TransportFailure::Unavailable)
    }
}

#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("user directory is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid directory url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}
