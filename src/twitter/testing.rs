//! In-memory transport replaying canned responses.

use crate::twitter::{Error, RawResponse, Request, Transport};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type Reply = Result<RawResponse, Error>;

pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Arc<Mutex<Vec<Request>>>,
    hang: bool,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Default::default(),
            hang: false,
        }
    }

    /// A transport that never answers.
    pub fn pending() -> Self {
        Self {
            hang: true,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<Request>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse, Error> {
        self.requests.lock().unwrap().push(request);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Malformed("no scripted reply left".to_string())))
    }
}

pub fn response(status: u16, headers: &[(&'static str, &str)], body: &str) -> Reply {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        map.insert(*k, HeaderValue::from_str(v).unwrap());
    }
    Ok(RawResponse {
        status,
        headers: map,
        body: body.as_bytes().to_vec(),
    })
}

pub fn ok(body: &str) -> Reply {
    response(200, &[], body)
}

pub fn rate_limited() -> Reply {
    response(
        429,
        &[("x-rate-limit-limit", "900"), ("x-rate-limit-remaining", "0")],
        r#"{"errors":[{"code":88,"message":"Rate limit exceeded"}]}"#,
    )
}

pub fn tweet_json(id: u64, created_at: &str) -> String {
    format!(
        r#"{{"id":{id},"id_str":"{id}","created_at":"{created_at}","text":"tweet {id}","user":{{"id":1,"screen_name":"bob"}}}}"#
    )
}

/// A page of tweets with the given ids, all from mid January 2020.
pub fn page(ids: &[u64]) -> Reply {
    let tweets: Vec<String> = ids
        .iter()
        .map(|id| tweet_json(*id, "Wed Jan 15 12:00:00 +0000 2020"))
        .collect();
    ok(&format!("[{}]", tweets.join(",")))
}
