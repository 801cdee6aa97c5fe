use thiserror::Error;

/// Errors raised while talking to the record store or preparing a report for it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The report was rejected before it was sent.
    #[error("Invalid report: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
