use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure came from talking to the backend rather than from local state.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::Http { .. } | AppError::InvalidResponse(_)
        )
    }
}

// Implement From traits for common error types to simplify conversion

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => AppError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_decode() => AppError::InvalidResponse(e.to_string()),
            None => AppError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::InvalidResponse(format!("Serialization error: {}", e))
    }
}
