use crate::twitter::oauth::OAuthSigner;
use crate::twitter::{Authentication, Error, Method, RawResponse, Request, Transport};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

const TIMEOUT_SEC: u64 = 10;

/// Sends requests over HTTPS, signed for the configured user.
#[derive(Clone)]
pub struct OAuthTransport {
    client: reqwest::Client,
    signer: OAuthSigner,
}

impl OAuthTransport {
    pub fn new(auth: &Authentication) -> Result<Self, Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(TIMEOUT_SEC))
                .user_agent(concat!("rmtweet/", env!("CARGO_PKG_VERSION")))
                .build()?,
            signer: OAuthSigner::new(auth),
        })
    }
}

#[async_trait]
impl Transport for OAuthTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse, Error> {
        let params: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        let mut base = request.url.clone();
        base.set_query(None);
        base.set_fragment(None);
        let authorization = self
            .signer
            .sign(request.method.as_str(), base.as_str(), &params)?;

        let builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };
        let response = builder.header(AUTHORIZATION, authorization).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Malformed(e.to_string()))?;
        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
