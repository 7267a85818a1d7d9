use crate::twitter::error::Error;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub const USER_TIMELINE: &str = "https://api.twitter.com/1.1/statuses/user_timeline.json";
pub const DESTROY_TWEET: &str = "https://api.twitter.com/1.1/statuses/destroy/:id.json";
pub const FAVORITES: &str = "https://api.twitter.com/1.1/favorites/list.json";
pub const DESTROY_FAVORITE: &str = "https://api.twitter.com/1.1/favorites/destroy.json";

/// Query parameters of a request, encoded in key order.
pub type Query = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API endpoint whose path may contain `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    method: Method,
    url: Url,
}

impl Resource {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Replaces every `:name` placeholder in the path with `lookup(name)`.
    ///
    /// Fails without touching `self` if any placeholder resolves to nothing.
    pub fn render<F>(&self, mut lookup: F) -> Result<Resource, Error>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path = self.url.path();
        let bytes = path.as_bytes();
        let mut rendered = String::with_capacity(path.len());
        let mut offset = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b':' {
                i += 1;
                continue;
            }
            let start = i + 1;
            let end = bytes[start..]
                .iter()
                .position(|c| !c.is_ascii_lowercase())
                .map_or(bytes.len(), |n| start + n);
            if end == start {
                // A bare colon is part of the path.
                i += 1;
                continue;
            }
            let name = &path[start..end];
            let value = lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::MissingParameter(name.to_string()))?;
            rendered.push_str(&path[offset..i]);
            rendered.push_str(&value);
            offset = end;
            i = end;
        }
        let mut res = self.clone();
        if offset > 0 {
            rendered.push_str(&path[offset..]);
            res.url.set_path(&rendered);
        }
        Ok(res)
    }

    /// Finalizes the URL: consumes placeholder values from `query`, then merges
    /// what is left with the static query of the resource.
    ///
    /// # Panics
    ///
    /// If `query` carries a key the resource already defines statically. That
    /// can only come from a badly defined endpoint, never from user input.
    pub fn with_query(&self, mut query: Query) -> Result<Url, Error> {
        let res = self.render(|name| query.remove(name))?;
        let mut url = res.url;
        let fixed: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for (key, _) in &fixed {
            assert!(
                !query.contains_key(key),
                "options provided option {:?} which already exists in {}",
                key,
                self.url.path(),
            );
        }
        query.extend(fixed);
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&query);
        }
        Ok(url)
    }
}

/// A mutation of the query map of a single request.
#[derive(Clone)]
pub struct QueryOption(Arc<dyn Fn(&mut Query) + Send + Sync>);

impl QueryOption {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Query) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn number(name: &str, n: u64) -> Self {
        let name = name.to_string();
        Self::new(move |q| {
            q.insert(name.clone(), n.to_string());
        })
    }

    /// Applies `opts` in order.
    pub fn all(opts: Vec<QueryOption>) -> Self {
        Self::new(move |q| {
            for opt in &opts {
                opt.apply(q);
            }
        })
    }

    pub fn apply(&self, query: &mut Query) {
        (self.0)(query)
    }
}

impl fmt::Debug for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueryOption")
    }
}

/// Builds the query map produced by applying `opts` in order.
pub fn build_query(opts: &[QueryOption]) -> Query {
    let mut query = Query::new();
    for opt in opts {
        opt.apply(&mut query);
    }
    query
}

/// The fixed set of endpoints used by the tool.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub user_timeline: Resource,
    pub destroy_tweet: Resource,
    pub favorites: Resource,
    pub destroy_favorite: Resource,
}

impl Catalog {
    pub fn new() -> Result<Self, url::ParseError> {
        Ok(Self {
            user_timeline: Resource::new(Method::Get, Url::parse(USER_TIMELINE)?),
            destroy_tweet: Resource::new(Method::Post, Url::parse(DESTROY_TWEET)?),
            favorites: Resource::new(Method::Get, Url::parse(FAVORITES)?),
            destroy_favorite: Resource::new(Method::Post, Url::parse(DESTROY_FAVORITE)?),
        })
    }
}

/// Kind of items to work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Tweets,
    Favorites,
}

impl Target {
    /// Returns the (list, destroy) resources for this kind of item.
    pub fn resources(self, catalog: &Catalog) -> (Resource, Resource) {
        match self {
            Target::Tweets => (catalog.user_timeline.clone(), catalog.destroy_tweet.clone()),
            Target::Favorites => (catalog.favorites.clone(), catalog.destroy_favorite.clone()),
        }
    }
}
