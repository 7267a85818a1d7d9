use crate::model::ErrorInfo;
use crate::twitter::rate_limit::RateLimit;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Error performing HTTP request: {0}")]
    Transport(#[source] Arc<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Unable to read response body: {0}")]
    Malformed(String),
    #[error("Unable to decode response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
    #[error("No parameter {0:?} provided")]
    MissingParameter(String),
    #[error("Unable to sign request: {0}")]
    Signing(String),
    #[error("Bad rate limit header {header}: {value:?}")]
    RateLimitHeader { header: &'static str, value: String },
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn transport<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport(Arc::new(e))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(Arc::new(e))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::transport(e)
    }
}

/// Unsuccessful response from the API.
#[derive(Debug, Clone, Error)]
pub struct ApiError {
    pub status: u16,
    pub errors: Vec<ErrorInfo>,
    pub rate_limit: RateLimit,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "twitter: bad status code: {}", self.status)?;
        for (i, info) in self.errors.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{} (code {})", info.message.trim_matches('.'), info.code)?;
        }
        Ok(())
    }
}
