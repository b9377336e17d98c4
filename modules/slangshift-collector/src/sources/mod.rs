//! Platform adapters behind a common trait. Each source turns a keyword
//! into a finite list of query strategies and fetches bounded pages of
//! candidate posts for one strategy at a time.

pub mod feed;
pub mod forum;

pub use feed::FeedSource;
pub use forum::ForumSource;

use std::fmt::Display;
use std::ops::Range;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slangshift_common::Platform;

/// A post as fetched from a platform, before the filter pipeline runs.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub native_id: String,
    pub text: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub username: String,
    pub subreddit: Option<String>,
}

#[async_trait]
pub trait PostSource: Send + Sync {
    type Strategy: Display + Send + Sync;

    fn platform(&self) -> Platform;

    /// Deterministic, finite strategy list for one keyword. The collection
    /// loop tries strategies in order and re-fetches each until it yields
    /// nothing unseen.
    fn strategies(&self, keyword: &str) -> Vec<Self::Strategy>;

    /// Fetch one bounded page of candidates. Re-invoking with the same
    /// strategy is always safe.
    async fn fetch(&self, keyword: &str, strategy: &Self::Strategy) -> Result<Vec<RawPost>>;

    /// Delay range between consecutive fetches, in milliseconds.
    fn fetch_delay_ms(&self) -> Range<u64>;
}
