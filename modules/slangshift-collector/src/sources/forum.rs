//! Reddit search adapter. Sweeps a fixed grid of query variants, sort
//! orders, and time windows so one keyword surfaces from many angles.

use std::fmt;
use std::ops::Range;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reddit_client::RedditClient;
use slangshift_common::Platform;

use super::{PostSource, RawPost};

const SORTS: [&str; 5] = ["relevance", "hot", "new", "top", "comments"];
const TIME_FILTERS: [&str; 6] = ["all", "year", "month", "week", "day", "hour"];

/// Max results per search request (the API page cap).
const PAGE_LIMIT: u32 = 100;

/// One point in the search grid.
#[derive(Debug, Clone)]
pub struct ForumStrategy {
    pub query: String,
    pub sort: &'static str,
    pub time_filter: &'static str,
}

impl fmt::Display for ForumStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q={} sort={} t={}", self.query, self.sort, self.time_filter)
    }
}

/// Query variant x sort x time window, variant-major: broad matches first,
/// then field-restricted searches.
pub fn strategy_grid(keyword: &str) -> Vec<ForumStrategy> {
    let variants = [
        keyword.to_string(),
        format!("body:\"{keyword}\""),
        format!("title:\"{keyword}\""),
        format!("comment:\"{keyword}\""),
    ];

    let mut strategies = Vec::with_capacity(variants.len() * SORTS.len() * TIME_FILTERS.len());
    for query in &variants {
        for sort in SORTS {
            for time_filter in TIME_FILTERS {
                strategies.push(ForumStrategy {
                    query: query.clone(),
                    sort,
                    time_filter,
                });
            }
        }
    }
    strategies
}

pub struct ForumSource {
    client: RedditClient,
}

impl ForumSource {
    pub fn new(client: RedditClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostSource for ForumSource {
    type Strategy = ForumStrategy;

    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    fn strategies(&self, keyword: &str) -> Vec<ForumStrategy> {
        strategy_grid(keyword)
    }

    async fn fetch(&self, _keyword: &str, strategy: &ForumStrategy) -> Result<Vec<RawPost>> {
        let submissions = self
            .client
            .search(&strategy.query, strategy.sort, strategy.time_filter, PAGE_LIMIT)
            .await
            .with_context(|| format!("Reddit search failed for {strategy}"))?;

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let created_at = submission.created_at();
                RawPost {
                    native_id: submission.id,
                    text: format!("{}\n{}", submission.title, submission.selftext)
                        .trim()
                        .to_string(),
                    url: submission.url,
                    created_at,
                    username: submission
                        .author
                        .unwrap_or_else(|| "[deleted]".to_string()),
                    subreddit: Some(submission.subreddit),
                }
            })
            .collect())
    }

    fn fetch_delay_ms(&self) -> Range<u64> {
        1000..1500
    }
}
