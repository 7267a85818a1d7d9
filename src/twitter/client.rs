use crate::model::ErrorResponse;
use crate::twitter::error::{ApiError, Error};
use crate::twitter::rate_limit::RateLimit;
use crate::twitter::resource::{build_query, QueryOption, Resource};
use crate::twitter::{Request, Transport};
use tokio_util::sync::CancellationToken;

pub struct Client {
    transport: Box<dyn Transport>,
}

impl Client {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Calls `resource` with the query produced by `opts` and returns the raw
    /// body of a successful response.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        resource: &Resource,
        opts: &[QueryOption],
    ) -> Result<Vec<u8>, Error> {
        let url = resource.with_query(build_query(opts))?;
        let request = Request {
            method: resource.method(),
            url,
        };
        log::debug!("{} {}", request.method, request.url);
        let response = tokio::select! {
            response = self.transport.execute(request) => response?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        if (200..300).contains(&response.status) {
            return Ok(response.body);
        }
        let errors = serde_json::from_slice::<ErrorResponse>(&response.body)
            .map(|r| r.errors)
            .unwrap_or_default();
        let rate_limit = RateLimit::from_headers(&response.headers).unwrap_or_else(|e| {
            log::debug!("Ignoring rate limit headers: {}", e);
            RateLimit::default()
        });
        Err(ApiError {
            status: response.status,
            errors,
            rate_limit,
        }
        .into())
    }
}
