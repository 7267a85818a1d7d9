pub mod client;
pub mod error;
pub mod oauth;
pub mod rate_limit;
pub mod resource;
pub mod timeline;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use error::{ApiError, Error};
pub use rate_limit::{is_rate_limited, relax, RateLimit};
pub use resource::{Catalog, Method, QueryOption, Resource, Target};
pub use timeline::Timeline;
pub use transport::OAuthTransport;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use url::Url;

/// OAuth 1.0a user credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    pub consumer: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

/// A fully formed API call. None of the endpoints take a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
}

#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Executes requests against the API with authentication already applied.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<RawResponse, Error>;
}
