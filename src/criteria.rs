use crate::model::Tweet;
use chrono::{NaiveDate, Utc};

/// Selects the tweets to destroy.
///
/// **An empty (default) `Criteria` matches every tweet.** Running the
/// destroyer without any filter deletes the whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Earliest day (UTC) to include.
    pub min_date: Option<NaiveDate>,
    /// Latest day (UTC) to include.
    pub max_date: Option<NaiveDate>,
    pub replies_only: bool,
    /// Only replies to this screen name.
    pub replies_to: Option<String>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        *self == Criteria::default()
    }

    pub fn matches(&self, tweet: &Tweet) -> bool {
        if self.is_empty() {
            return true;
        }
        if let Some(name) = &self.replies_to {
            if tweet.in_reply_to_screen_name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if self.replies_only && !tweet.is_reply() {
            return false;
        }
        let date = tweet.created_at.with_timezone(&Utc).date_naive();
        if matches!(self.min_date, Some(min) if date < min) {
            return false;
        }
        if matches!(self.max_date, Some(max) if date > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_time, User};

    fn tweet(created_at: &str, reply_to: Option<(u64, &str)>) -> Tweet {
        Tweet {
            id: 1,
            id_str: "1".to_string(),
            created_at: parse_time(created_at).unwrap(),
            text: "hello".to_string(),
            truncated: false,
            source: String::new(),
            user: User::default(),
            lang: None,
            retweeted: false,
            in_reply_to_status_id: reply_to.map(|(id, _)| id),
            in_reply_to_user_id: reply_to.map(|_| 99),
            in_reply_to_screen_name: reply_to.map(|(_, name)| name.to_string()),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let criteria = Criteria::default();
        assert!(criteria.is_empty());
        for t in [
            tweet("Wed Jan 15 12:00:00 +0000 2020", None),
            tweet("Thu Jan 01 00:00:00 +0000 1970", Some((5, "alice"))),
            tweet("Sat Feb 01 23:59:59 -0700 2031", Some((0, ""))),
        ] {
            assert!(criteria.matches(&t));
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let criteria = Criteria {
            min_date: day(2020, 1, 1),
            max_date: day(2020, 1, 31),
            ..Default::default()
        };
        assert!(criteria.matches(&tweet("Wed Jan 15 12:00:00 +0000 2020", None)));
        assert!(criteria.matches(&tweet("Wed Jan 01 00:00:00 +0000 2020", None)));
        assert!(criteria.matches(&tweet("Fri Jan 31 23:59:59 +0000 2020", None)));
        assert!(!criteria.matches(&tweet("Sat Feb 01 00:00:00 +0000 2020", None)));
        assert!(!criteria.matches(&tweet("Tue Dec 31 23:59:59 +0000 2019", None)));
    }

    #[test]
    fn dates_compare_in_utc() {
        let criteria = Criteria {
            max_date: day(2020, 1, 31),
            ..Default::default()
        };
        // 20:00 on the 31st in UTC-07:00 is already February 1st in UTC.
        assert!(!criteria.matches(&tweet("Fri Jan 31 20:00:00 -0700 2020", None)));
    }

    #[test]
    fn replies_only() {
        let criteria = Criteria {
            replies_only: true,
            ..Default::default()
        };
        assert!(!criteria.matches(&tweet("Wed Jan 15 12:00:00 +0000 2020", None)));
        assert!(!criteria.matches(&tweet(
            "Wed Jan 15 12:00:00 +0000 2020",
            Some((0, "alice"))
        )));
        assert!(criteria.matches(&tweet(
            "Wed Jan 15 12:00:00 +0000 2020",
            Some((42, "alice"))
        )));
    }

    #[test]
    fn replies_to_exact_name() {
        let criteria = Criteria {
            replies_to: Some("alice".to_string()),
            ..Default::default()
        };
        let at = "Wed Jan 15 12:00:00 +0000 2020";
        assert!(criteria.matches(&tweet(at, Some((42, "alice")))));
        assert!(!criteria.matches(&tweet(at, Some((42, "Alice")))));
        assert!(!criteria.matches(&tweet(at, Some((42, "alice2")))));
        assert!(!criteria.matches(&tweet(at, None)));
    }
}
