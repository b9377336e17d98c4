pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::{AccessToken, Listing, Submission};

use reqwest::header::USER_AGENT;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";

/// Script-app credentials for the OAuth password grant.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

pub struct RedditClient {
    client: reqwest::Client,
    user_agent: String,
    token: String,
}

impl RedditClient {
    /// Exchange script-app credentials for a bearer token.
    pub async fn login(credentials: &RedditCredentials) -> Result<Self> {
        tracing::info!(username = %credentials.username, "Authenticating with Reddit");

        let client = reqwest::Client::new();
        let params = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let resp = client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(USER_AGENT, &credentials.user_agent)
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        // Reddit reports bad credentials with a 200 and an error payload.
        let token: AccessToken = serde_json::from_str(&body)
            .map_err(|_| RedditError::Auth(format!("Unexpected token response: {body}")))?;

        Ok(Self {
            client,
            user_agent: credentials.user_agent.clone(),
            token: token.access_token,
        })
    }

    /// Search all of Reddit for posts matching a query.
    ///
    /// `sort` is one of relevance/hot/new/top/comments; `time_filter` is one
    /// of all/year/month/week/day/hour. The API caps `limit` at 100.
    pub async fn search(
        &self,
        query: &str,
        sort: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<Submission>> {
        let limit = limit.min(100).to_string();
        let url = format!("{}/r/all/search", OAUTH_BASE_URL);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("q", query),
                ("sort", sort),
                ("t", time_filter),
                ("limit", limit.as_str()),
                ("restrict_sr", "on"),
                ("raw_json", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let listing: Listing<Submission> = resp.json().await?;
        let posts: Vec<Submission> = listing.data.children.into_iter().map(|c| c.data).collect();
        tracing::debug!(query, sort, time_filter, count = posts.len(), "Reddit search returned");
        Ok(posts)
    }
}
