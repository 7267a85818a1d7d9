//! Bulk deletion of tweets and favorites through the Twitter v1.1 API.

pub mod config;
pub mod criteria;
pub mod destroy;
pub mod model;
pub mod twitter;

pub use criteria::Criteria;
pub use destroy::{Confirmer, Destroyer, Notifier};
