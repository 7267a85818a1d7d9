use crate::criteria::Criteria;
use crate::destroy::DEFAULT_PAGE_SIZE;
use crate::twitter::{Authentication, Target};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tokio::fs;

/// Format of dates given on the command line, e.g. `31.01.2020`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Twitter credentials as given by one source, each possibly unset.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Credentials {
    pub consumer: Option<String>,
    pub consumer_secret: Option<String>,
    pub token: Option<String>,
    pub token_secret: Option<String>,
}

/// Every option of a run as given by one source: the command line (with its
/// environment fallbacks) or the JSON config file.
///
/// ```json
/// {
///   "twitter": {"consumer": "..", "consumer-secret": "..", "token": "..", "token-secret": ".."},
///   "tweets": true,
///   "min-date": "01.01.2019",
///   "replies-to": "alice"
/// }
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    pub twitter: Credentials,
    pub tweets: bool,
    pub favorites: bool,
    #[serde(deserialize_with = "deserialize_date")]
    pub min_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_date")]
    pub max_date: Option<NaiveDate>,
    pub replies: bool,
    pub replies_to: Option<String>,
    pub force: bool,
    pub verbose: bool,
    pub count: Option<u64>,
}

/// Everything a run needs, with all sources merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub auth: Authentication,
    pub target: Target,
    pub criteria: Criteria,
    pub force: bool,
    pub verbose: bool,
    pub count: u64,
}

fn pick(first: Option<String>, second: Option<String>) -> Option<String> {
    first
        .filter(|s| !s.is_empty())
        .or_else(|| second.filter(|s| !s.is_empty()))
}

impl Credentials {
    fn or(self, other: Credentials) -> Credentials {
        Credentials {
            consumer: pick(self.consumer, other.consumer),
            consumer_secret: pick(self.consumer_secret, other.consumer_secret),
            token: pick(self.token, other.token),
            token_secret: pick(self.token_secret, other.token_secret),
        }
    }

    fn into_auth(self) -> anyhow::Result<Authentication> {
        let fields = [
            (self.consumer, "consumer"),
            (self.consumer_secret, "consumer-secret"),
            (self.token, "token"),
            (self.token_secret, "token-secret"),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(value, _)| value.as_deref().map_or(true, str::is_empty))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            bail!("Missing twitter credentials: {}", missing.join(", "));
        }
        let [consumer, consumer_secret, token, token_secret] =
            fields.map(|(value, _)| value.unwrap_or_default());
        Ok(Authentication {
            consumer,
            consumer_secret,
            token,
            token_secret,
        })
    }
}

impl Options {
    /// Fills whatever is unset here from `other`.
    ///
    /// Switches cannot be turned off from the command line, so they are on
    /// when either source turns them on. The target is taken as a whole from
    /// the first source that names one.
    pub fn or(self, other: Options) -> Options {
        let (tweets, favorites) = if self.tweets || self.favorites {
            (self.tweets, self.favorites)
        } else {
            (other.tweets, other.favorites)
        };
        Options {
            twitter: self.twitter.or(other.twitter),
            tweets,
            favorites,
            min_date: self.min_date.or(other.min_date),
            max_date: self.max_date.or(other.max_date),
            replies: self.replies || other.replies,
            replies_to: pick(self.replies_to, other.replies_to),
            force: self.force || other.force,
            verbose: self.verbose || other.verbose,
            count: self.count.or(other.count),
        }
    }

    pub fn resolve(self) -> anyhow::Result<Settings> {
        let target = match (self.tweets, self.favorites) {
            (true, false) => Target::Tweets,
            (false, true) => Target::Favorites,
            (true, true) => bail!("Only one of tweets or favorites can be selected"),
            (false, false) => bail!("One of tweets or favorites must be selected"),
        };
        Ok(Settings {
            auth: self.twitter.into_auth()?,
            target,
            criteria: Criteria {
                min_date: self.min_date,
                max_date: self.max_date,
                replies_only: self.replies,
                replies_to: self.replies_to.filter(|s| !s.is_empty()),
            },
            force: self.force,
            verbose: self.verbose,
            count: self.count.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

pub async fn load(path: &Path) -> anyhow::Result<Options> {
    let config = fs::read_to_string(path)
        .await
        .with_context(|| format!("Unable to read config file {}", path.display()))?;
    serde_json::from_str::<Options>(&config)
        .with_context(|| format!("Unable to deserialize config file {}", path.display()))
}

/// Merges `options` over the config file at `path` (if any) and checks the result.
pub async fn resolve(path: Option<&Path>, options: Options) -> anyhow::Result<Settings> {
    let options = match path {
        Some(path) => options.or(load(path).await?),
        None => options,
    };
    options.resolve()
}
