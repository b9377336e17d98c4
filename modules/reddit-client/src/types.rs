use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Password-grant token response.
#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Listing envelope wrapping search results.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

/// A link (t3) as returned by post search.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub url: String,
    pub created_utc: f64,
    #[serde(default)]
    pub author: Option<String>,
    pub subreddit: String,
}

impl Submission {
    /// Creation time as UTC, when the epoch timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}
