use crate::twitter::error::Error;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// How long to wait when the server did not say when the window resets.
const FALLBACK_RELAX: Duration = Duration::from_secs(1);

const TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    /// End of the current window, if known.
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        let mut limit = RateLimit::default();
        if let Some(n) = parse_header::<u32>(headers, LIMIT_HEADER)? {
            limit.limit = n;
        }
        if let Some(n) = parse_header::<u32>(headers, REMAINING_HEADER)? {
            limit.remaining = n;
        }
        if let Some(secs) = parse_header::<i64>(headers, RESET_HEADER)? {
            if secs != 0 {
                limit.reset = Utc.timestamp_opt(secs, 0).single();
            }
        }
        Ok(limit)
    }

    /// Time to wait, as seen from `now`, before the server accepts requests again.
    pub fn relax_for(&self, now: DateTime<Utc>) -> Duration {
        match self.reset {
            Some(reset) => (reset - now).to_std().unwrap_or(Duration::ZERO),
            None => FALLBACK_RELAX,
        }
    }
}

fn parse_header<T: std::str::FromStr>(
    headers: &HeaderMap,
    header: &'static str,
) -> Result<Option<T>, Error> {
    let value = match headers.get(header) {
        Some(value) => value,
        None => return Ok(None),
    };
    let malformed = || Error::RateLimitHeader {
        header,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };
    let s = value.to_str().map_err(|_| malformed())?.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse().map(Some).map_err(|_| malformed())
}

/// Returns the rate limit snapshot if `err` reports an exhausted quota.
pub fn is_rate_limited(err: &Error) -> Option<RateLimit> {
    match err {
        Error::Api(api) if api.status == TOO_MANY_REQUESTS => Some(api.rate_limit),
        _ => None,
    }
}

/// Sleeps until the window described by `limit` resets, or until `cancel` fires.
pub async fn relax(cancel: &CancellationToken, limit: &RateLimit) -> Result<(), Error> {
    let sleep = limit.relax_for(Utc::now());
    log::info!("Rate limited, relaxing for {:?}", sleep);
    tokio::select! {
        _ = tokio::time::sleep(sleep) => Ok(()),
        _ = cancel.cancelled() => Err(Error::Cancelled),
    }
}
