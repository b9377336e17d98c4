use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a record was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Reddit,
    Twitter,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage classification for one record. Collection writes records as
/// `Unclassified`; the classification stage overwrites with a final label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Old,
    New,
    Unknown,
    Error,
    #[default]
    Unclassified,
}

impl Classification {
    /// Normalize a raw model reply to a label. Anything other than an exact
    /// (trimmed, case-insensitive) "old" or "new" is `Unknown`.
    pub fn from_model_output(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "old" => Classification::Old,
            "new" => Classification::New,
            _ => Classification::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Old => "old",
            Classification::New => "new",
            Classification::Unknown => "unknown",
            Classification::Error => "error",
            Classification::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collected post.
///
/// `correlation_id` is assigned exactly once at collection time and is the
/// token the classification batch echoes back; `native_id` is the platform's
/// own identity and is only used for intra-platform dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub correlation_id: Uuid,
    pub native_id: String,
    pub text: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    pub platform: Platform,
    pub keyword: String,
    #[serde(default)]
    pub classification: Classification,
}
