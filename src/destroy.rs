use crate::criteria::Criteria;
use crate::model::Tweet;
use crate::twitter::rate_limit::{is_rate_limited, relax};
use crate::twitter::resource::{QueryOption, Resource};
use crate::twitter::{Client, Error, Timeline};
use futures::{pin_mut, TryStreamExt};
use governor::Quota;
use tokio_util::sync::CancellationToken;

/// Largest page the list endpoints serve.
pub const DEFAULT_PAGE_SIZE: u64 = 200;

/// Asks whether a matching tweet should really be destroyed.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, tweet: &Tweet) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&Tweet) -> bool + Send + Sync,
{
    fn confirm(&self, tweet: &Tweet) -> bool {
        self(tweet)
    }
}

/// Told about every tweet that was destroyed.
pub trait Notifier: Send + Sync {
    fn destroyed(&self, tweet: &Tweet);
}

impl<F> Notifier for F
where
    F: Fn(&Tweet) + Send + Sync,
{
    fn destroyed(&self, tweet: &Tweet) {
        self(tweet)
    }
}

pub struct Destroyer {
    client: Client,
    get: Resource,
    del: Resource,
    criteria: Criteria,
    page_size: u64,
    quota: Option<Quota>,
    confirmer: Option<Box<dyn Confirmer>>,
    notifier: Option<Box<dyn Notifier>>,
}

impl Destroyer {
    /// Destroys what `get` lists through `del`, filtered by `criteria`.
    pub fn new(client: Client, get: Resource, del: Resource, criteria: Criteria) -> Self {
        Self {
            client,
            get,
            del,
            criteria,
            page_size: DEFAULT_PAGE_SIZE,
            quota: None,
            confirmer: None,
            notifier: None,
        }
    }

    pub fn page_size(mut self, count: u64) -> Self {
        self.page_size = count;
        self
    }

    /// Overrides the pacing of page requests.
    pub fn quota(mut self, quota: Quota) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn confirmer<C: Confirmer + 'static>(mut self, confirmer: C) -> Self {
        self.confirmer = Some(Box::new(confirmer));
        self
    }

    pub fn notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Runs until the listing is exhausted or an error occurs.
    ///
    /// Tweets destroyed before an error stay destroyed.
    pub async fn destroy(&self, cancel: &CancellationToken) -> Result<(), Error> {
        if self.criteria.is_empty() {
            log::warn!("No criteria given, every item is eligible for destruction");
        }
        let mut timeline = Timeline::new(
            &self.client,
            self.get.clone(),
            vec![QueryOption::number("count", self.page_size)],
        );
        if let Some(quota) = self.quota {
            timeline = timeline.with_quota(quota);
        }
        let tweets = timeline.into_stream(cancel.clone());
        pin_mut!(tweets);
        while let Some(tweet) = tweets.try_next().await? {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if !self.criteria.matches(&tweet) {
                log::trace!("Skipping {}: does not match", tweet.id);
                continue;
            }
            if let Some(confirmer) = &self.confirmer {
                if !confirmer.confirm(&tweet) {
                    log::debug!("Skipping {}: not confirmed", tweet.id);
                    continue;
                }
            }
            self.destroy_one(cancel, &tweet).await?;
            log::debug!("Destroyed {}", tweet.id);
            if let Some(notifier) = &self.notifier {
                notifier.destroyed(&tweet);
            }
        }
        Ok(())
    }

    async fn destroy_one(&self, cancel: &CancellationToken, tweet: &Tweet) -> Result<(), Error> {
        let opts = [QueryOption::number("id", tweet.id)];
        loop {
            match self.client.execute(cancel, &self.del, &opts).await {
                Ok(_) => return Ok(()),
                Err(e) => match is_rate_limited(&e) {
                    // A 429 means the call was not applied, so it is safe to repeat.
                    Some(limit) => relax(cancel, &limit).await?,
                    None => return Err(e),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::resource::{Catalog, Target};
    use crate::twitter::testing::{ok, page, rate_limited, response, tweet_json, ScriptedTransport};
    use crate::twitter::Request;
    use std::num::NonZeroU32;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn fast() -> Quota {
        Quota::per_second(NonZeroU32::new(1000).unwrap()).allow_burst(NonZeroU32::new(100).unwrap())
    }

    fn destroyer(transport: ScriptedTransport, target: Target, criteria: Criteria) -> Destroyer {
        let catalog = Catalog::new().unwrap();
        let (get, del) = target.resources(&catalog);
        Destroyer::new(Client::new(transport), get, del, criteria).quota(fast())
    }

    fn recorder() -> (Arc<Mutex<Vec<u64>>>, impl Fn(&Tweet) + Send + Sync) {
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        (seen, move |t: &Tweet| sink.lock().unwrap().push(t.id))
    }

    fn paths(requests: &Arc<Mutex<Vec<Request>>>) -> Vec<String> {
        requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| match r.url.query() {
                Some(q) => format!("{} {}?{}", r.method, r.url.path(), q),
                None => format!("{} {}", r.method, r.url.path()),
            })
            .collect()
    }

    #[tokio::test]
    async fn filters_confirms_and_destroys() {
        // A replies to alice, B is not a reply, C replies to alice but is declined.
        let a = tweet_json(30, "Wed Jan 15 12:00:00 +0000 2020")
            .replace(r#""text""#, r#""in_reply_to_status_id":7,"in_reply_to_screen_name":"alice","text""#);
        let b = tweet_json(20, "Wed Jan 15 12:00:00 +0000 2020");
        let c = tweet_json(10, "Wed Jan 15 12:00:00 +0000 2020")
            .replace(r#""text""#, r#""in_reply_to_status_id":8,"in_reply_to_screen_name":"alice","text""#);
        let transport = ScriptedTransport::new(vec![
            ok(&format!("[{a},{b},{c}]")),
            ok("{}"),
            page(&[]),
        ]);
        let requests = transport.requests();
        let (destroyed, notifier) = recorder();
        let (asked, ask) = recorder();
        let criteria = Criteria {
            replies_to: Some("alice".to_string()),
            ..Default::default()
        };
        let d = destroyer(transport, Target::Tweets, criteria)
            .confirmer(move |t: &Tweet| {
                ask(t);
                t.id != 10
            })
            .notifier(notifier);

        d.destroy(&CancellationToken::new()).await.unwrap();

        assert_eq!(*destroyed.lock().unwrap(), vec![30]);
        assert_eq!(*asked.lock().unwrap(), vec![30, 10]);
        assert_eq!(
            paths(&requests),
            vec![
                "GET /1.1/statuses/user_timeline.json?count=200",
                "POST /1.1/statuses/destroy/30.json",
                "GET /1.1/statuses/user_timeline.json?count=200&max_id=9",
            ]
        );
    }

    #[tokio::test]
    async fn empty_criteria_destroys_everything() {
        let transport = ScriptedTransport::new(vec![
            page(&[3, 2]),
            ok("{}"),
            ok("{}"),
            page(&[1]),
            ok("{}"),
        ]);
        let requests = transport.requests();
        let (destroyed, notifier) = recorder();
        let d = destroyer(transport, Target::Favorites, Criteria::default())
            .page_size(2)
            .notifier(notifier);

        d.destroy(&CancellationToken::new()).await.unwrap();

        assert_eq!(*destroyed.lock().unwrap(), vec![3, 2, 1]);
        assert_eq!(
            paths(&requests),
            vec![
                "GET /1.1/favorites/list.json?count=2",
                "POST /1.1/favorites/destroy.json?id=3",
                "POST /1.1/favorites/destroy.json?id=2",
                "GET /1.1/favorites/list.json?count=2&max_id=1",
                "POST /1.1/favorites/destroy.json?id=1",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_delete_is_retried_once() {
        let transport = ScriptedTransport::new(vec![
            page(&[5]),
            rate_limited(),
            ok("{}"),
            page(&[]),
        ]);
        let requests = transport.requests();
        let (destroyed, notifier) = recorder();
        let d = destroyer(transport, Target::Tweets, Criteria::default()).notifier(notifier);

        d.destroy(&CancellationToken::new()).await.unwrap();

        assert_eq!(*destroyed.lock().unwrap(), vec![5]);
        let paths = paths(&requests);
        assert_eq!(paths[1], "POST /1.1/statuses/destroy/5.json");
        assert_eq!(paths[2], "POST /1.1/statuses/destroy/5.json");
        assert_eq!(paths.len(), 4);
    }

    #[tokio::test]
    async fn other_delete_errors_abort() {
        let transport = ScriptedTransport::new(vec![
            page(&[3, 2, 1]),
            ok("{}"),
            response(
                403,
                &[],
                r#"{"errors":[{"code":63,"message":"User has been suspended."}]}"#,
            ),
            ok("{}"),
        ]);
        let requests = transport.requests();
        let (destroyed, notifier) = recorder();
        let d = destroyer(transport, Target::Tweets, Criteria::default()).notifier(notifier);

        let err = d.destroy(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, Error::Api(ref api) if api.status == 403));
        assert_eq!(*destroyed.lock().unwrap(), vec![3]);
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn listing_errors_abort() {
        let transport = ScriptedTransport::new(vec![response(500, &[], "")]);
        let d = destroyer(transport, Target::Tweets, Criteria::default());
        let err = d.destroy(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::Api(ref api) if api.status == 500));
    }

    #[tokio::test]
    async fn declining_confirmer_can_stop_the_run() {
        let transport = ScriptedTransport::new(vec![page(&[3, 2, 1])]);
        let requests = transport.requests();
        let (asked, ask) = recorder();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let d = destroyer(transport, Target::Tweets, Criteria::default()).confirmer(
            move |t: &Tweet| {
                ask(t);
                stop.cancel();
                false
            },
        );

        let err = d.destroy(&cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*asked.lock().unwrap(), vec![3]);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_relax() {
        let reset = (chrono::Utc::now().timestamp() + 3600).to_string();
        let transport = ScriptedTransport::new(vec![
            page(&[5]),
            response(429, &[("x-rate-limit-reset", reset.as_str())], ""),
        ]);
        let (destroyed, notifier) = recorder();
        let d = destroyer(transport, Target::Tweets, Criteria::default()).notifier(notifier);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(60), d.destroy(&cancel))
            .await
            .expect("destroy should return once cancelled");

        assert!(result.unwrap_err().is_cancelled());
        assert!(destroyed.lock().unwrap().is_empty());
    }
}
