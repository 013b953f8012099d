use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the user directory on non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(alias = "error")]
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[derive(Debug, Error)]
#[error("unknown sort field '{0}' (expected name, email or mobile)")]
pub struct ParseSortFieldError(pub String);
