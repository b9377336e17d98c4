pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;

/// Wait for a CSS selector to appear before the DOM is captured.
#[derive(Debug, Clone, Serialize)]
pub struct WaitForSelector {
    pub selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Options for the /content endpoint. The defaults capture the DOM as soon
/// as the page loads; script-heavy pages need a selector wait first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<WaitForSelector>,
    /// Capture whatever rendered when the wait times out, instead of
    /// failing the request.
    #[serde(skip_serializing_if = "is_false")]
    pub best_attempt: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

#[derive(Serialize)]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(flatten)]
    options: &'a ContentOptions,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML content for a URL via the /content endpoint.
    pub async fn content(&self, url: &str) -> Result<String> {
        self.content_with_options(url, &ContentOptions::default())
            .await
    }

    /// Fetch rendered HTML, waiting on page readiness per `options`.
    pub async fn content_with_options(
        &self,
        url: &str,
        options: &ContentOptions,
    ) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = ContentRequest { url, options };

        tracing::debug!(url, "Requesting rendered page");
        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
