use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit script app
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_username: String,
    pub reddit_password: String,
    pub reddit_user_agent: String,

    // OpenAI
    pub openai_api_key: String,

    // Browserless (rendered-page fetches for the feed source)
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Collection
    pub output_dir: String,
    pub target_count: usize,
    pub checkpoint_interval: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            reddit_client_id: required_env("REDDIT_CLIENT_ID"),
            reddit_client_secret: required_env("REDDIT_CLIENT_SECRET"),
            reddit_username: required_env("REDDIT_USERNAME"),
            reddit_password: required_env("REDDIT_PASSWORD"),
            reddit_user_agent: required_env("REDDIT_USER_AGENT"),
            openai_api_key: required_env("OPENAI_API_KEY"),
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            target_count: env::var("TARGET_COUNT")
                .unwrap_or_else(|_| "700".to_string())
                .parse()
                .expect("TARGET_COUNT must be a number"),
            checkpoint_interval: positive_interval(
                env::var("CHECKPOINT_INTERVAL")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .expect("CHECKPOINT_INTERVAL must be a number"),
            ),
        }
    }

    /// Load a minimal config for classification-only runs (no Reddit or
    /// Browserless credentials needed).
    pub fn classify_from_env() -> Self {
        Self {
            reddit_client_id: String::new(),
            reddit_client_secret: String::new(),
            reddit_username: String::new(),
            reddit_password: String::new(),
            reddit_user_agent: String::new(),
            openai_api_key: required_env("OPENAI_API_KEY"),
            browserless_url: String::new(),
            browserless_token: None,
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            target_count: 0,
            checkpoint_interval: 1,
        }
    }

    /// Log the non-secret parts of the configuration.
    pub fn log_redacted(&self) {
        info!(
            output_dir = %self.output_dir,
            target_count = self.target_count,
            checkpoint_interval = self.checkpoint_interval,
            browserless_url = %self.browserless_url,
            reddit_user = %self.reddit_username,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn positive_interval(value: usize) -> usize {
    if value == 0 {
        panic!("CHECKPOINT_INTERVAL must be positive");
    }
    value
}
