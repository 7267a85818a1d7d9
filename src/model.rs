use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

/// Layout of `created_at` timestamps returned by the v1.1 API,
/// e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TIME_LAYOUT: &str = "%a %b %d %H:%M:%S %z %Y";

pub fn parse_time(s: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, TIME_LAYOUT)
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_time(&s).map_err(|e| serde::de::Error::custom(format!("bad created_at {s:?}: {e}")))
}

#[derive(Deserialize, Debug, Clone)]
pub struct Tweet {
    pub id: u64,
    #[serde(default)]
    pub id_str: String,
    #[serde(deserialize_with = "deserialize_time")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub source: String,
    pub user: User,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub retweeted: bool,
    #[serde(default)]
    pub in_reply_to_status_id: Option<u64>,
    #[serde(default)]
    pub in_reply_to_user_id: Option<u64>,
    #[serde(default)]
    pub in_reply_to_screen_name: Option<String>,
}

impl Tweet {
    /// Whether this tweet answers another one.
    pub fn is_reply(&self) -> bool {
        matches!(self.in_reply_to_status_id, Some(id) if id != 0)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub id_str: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body returned alongside an unsuccessful status code.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorInfo>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
