use thiserror::Error;

pub type Result<T> = std::result::Result<T, NocoDbError>;

#[derive(Debug, Error)]
pub enum NocoDbError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for NocoDbError {
    fn from(err: reqwest::Error) -> Self {
        NocoDbError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for NocoDbError {
    fn from(err: serde_json::Error) -> Self {
        NocoDbError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for NocoDbError {
    fn from(err: url::ParseError) -> Self {
        NocoDbError::InvalidUrl(err.to_string())
    }
}
