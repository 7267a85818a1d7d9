//! Cursor pagination over tweet lists.
//!
//! Pages are requested newest first. After each page the cursor moves to just
//! below the oldest id seen, so the next request (`max_id`) only returns older
//! items. An empty page ends the walk.

use crate::model::Tweet;
use crate::twitter::client::Client;
use crate::twitter::error::Error;
use crate::twitter::rate_limit::{is_rate_limited, relax};
use crate::twitter::resource::{QueryOption, Resource};
use futures::Stream;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::VecDeque;
use std::num::NonZeroU32;
use tokio_util::sync::CancellationToken;

enum State {
    Open,
    Exhausted,
    Failed(Error),
}

pub struct Timeline<'c> {
    client: &'c Client,
    resource: Resource,
    options: Vec<QueryOption>,
    limiter: DefaultDirectRateLimiter,
    buffer: VecDeque<Tweet>,
    max_id: Option<u64>,
    state: State,
}

impl<'c> Timeline<'c> {
    pub fn new(client: &'c Client, resource: Resource, options: Vec<QueryOption>) -> Self {
        Self {
            client,
            resource,
            options,
            limiter: RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)),
            buffer: VecDeque::new(),
            max_id: None,
            state: State::Open,
        }
    }

    /// Replaces the local request pacing (one request per second by default).
    pub fn with_quota(mut self, quota: Quota) -> Self {
        self.limiter = RateLimiter::direct(quota);
        self
    }

    /// Returns the next tweet, `None` once the history is exhausted.
    pub async fn next(&mut self, cancel: &CancellationToken) -> Result<Option<Tweet>, Error> {
        loop {
            if let Some(tweet) = self.buffer.pop_front() {
                return Ok(Some(tweet));
            }
            match &self.state {
                State::Open => {}
                State::Exhausted => return Ok(None),
                State::Failed(e) => return Err(e.clone()),
            }
            match self.fetch(cancel).await {
                Ok(page) => self.load(page),
                Err(e) => {
                    self.state = State::Failed(e.clone());
                    return Err(e);
                }
            }
        }
    }

    fn load(&mut self, page: Vec<Tweet>) {
        let last = match page.last() {
            Some(tweet) => tweet.id,
            None => {
                log::debug!("Reached the end of {}", self.resource.url().path());
                self.state = State::Exhausted;
                return;
            }
        };
        log::debug!("Fetched {} items, oldest id {}", page.len(), last);
        match last.checked_sub(1) {
            Some(next) if next > 0 => self.max_id = Some(next),
            _ => self.state = State::Exhausted,
        }
        self.buffer.extend(page);
    }

    async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<Tweet>, Error> {
        loop {
            tokio::select! {
                _ = self.limiter.until_ready() => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }
            let mut opts = self.options.clone();
            if let Some(max_id) = self.max_id {
                opts.push(QueryOption::number("max_id", max_id));
            }
            match self.client.execute(cancel, &self.resource, &opts).await {
                Ok(body) => return Ok(serde_json::from_slice(&body)?),
                Err(e) => match is_rate_limited(&e) {
                    Some(limit) => relax(cancel, &limit).await?,
                    None => return Err(e),
                },
            }
        }
    }

    /// Adapts the timeline into a stream that ends with the history.
    pub fn into_stream(
        self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Tweet, Error>> + 'c {
        futures::stream::try_unfold(self, move |mut timeline| {
            let cancel = cancel.clone();
            async move {
                let next = timeline.next(&cancel).await?;
                Ok::<_, Error>(next.map(|tweet| (tweet, timeline)))
            }
        })
    }
}
