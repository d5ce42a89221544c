use thiserror::Error;

/// Failure modes of the upstream API calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required credential is missing; no request was issued.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{path} -> {status}: {body}")]
    Request {
        path: String,
        status: u16,
        body: String,
    },
    #[error("JSON parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}
