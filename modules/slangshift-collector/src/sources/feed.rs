//! X/Twitter search adapter. Search pages are rendered through Browserless
//! and mined for tweet articles; each strategy is one (result tab, query
//! variant) combination of the same keyword.

use std::fmt;
use std::ops::Range;

use anyhow::{Context, Result};
use async_trait::async_trait;
use browserless_client::{BrowserlessClient, ContentOptions, WaitForSelector};
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use slangshift_common::{text, Platform};
use url::Url;

use super::{PostSource, RawPost};

const SEARCH_BASE: &str = "https://x.com";

/// Tweets take a moment to hydrate; give up on the wait after this long
/// and take whatever rendered.
const RENDER_TIMEOUT_MS: u64 = 15_000;

const TABS: [&str; 2] = ["live", "top"];

/// One search page: a result tab plus a query variant.
#[derive(Debug, Clone)]
pub struct FeedStrategy {
    pub query: String,
    pub tab: &'static str,
}

impl fmt::Display for FeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q={} f={}", self.query, self.tab)
    }
}

/// Result tab x query variant, tab-major: the live feed is fresher, so it
/// is swept first across all variants.
pub fn strategy_grid(keyword: &str) -> Vec<FeedStrategy> {
    let variants = [
        keyword.to_string(),
        format!("\"{keyword}\""),
        format!("#{keyword}"),
    ];

    let mut strategies = Vec::with_capacity(TABS.len() * variants.len());
    for tab in TABS {
        for query in &variants {
            strategies.push(FeedStrategy {
                query: query.clone(),
                tab,
            });
        }
    }
    strategies
}

fn search_url(strategy: &FeedStrategy) -> String {
    let mut url = Url::parse(SEARCH_BASE).expect("valid search base");
    url.set_path("/search");
    url.query_pairs_mut()
        .append_pair("q", &strategy.query)
        .append_pair("f", strategy.tab)
        .append_pair("src", "typed_query");
    url.to_string()
}

pub struct FeedSource {
    client: BrowserlessClient,
}

impl FeedSource {
    pub fn new(client: BrowserlessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostSource for FeedSource {
    type Strategy = FeedStrategy;

    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn strategies(&self, keyword: &str) -> Vec<FeedStrategy> {
        strategy_grid(keyword)
    }

    async fn fetch(&self, keyword: &str, strategy: &FeedStrategy) -> Result<Vec<RawPost>> {
        let url = search_url(strategy);
        let options = ContentOptions {
            wait_for_selector: Some(WaitForSelector {
                selector: "article".to_string(),
                timeout: Some(RENDER_TIMEOUT_MS),
            }),
            best_attempt: true,
        };

        let html = self
            .client
            .content_with_options(&url, &options)
            .await
            .with_context(|| format!("Rendered fetch failed for {strategy}"))?;

        Ok(extract_posts(&html, keyword))
    }

    fn fetch_delay_ms(&self) -> Range<u64> {
        900..1200
    }
}

/// Mine tweet articles out of a rendered search page. An article counts as
/// a candidate only when it carries a status link (the native id) and its
/// text mentions the keyword.
pub fn extract_posts(html: &str, keyword: &str) -> Vec<RawPost> {
    let document = Html::parse_document(html);
    let article_sel = Selector::parse("article").unwrap();
    let status_link_sel = Selector::parse(r#"a[href*="/status/"]"#).unwrap();
    let text_sel = Selector::parse(r#"div[data-testid="tweetText"]"#).unwrap();
    let span_sel = Selector::parse("span").unwrap();
    let user_sel = Selector::parse(r#"div[data-testid="User-Name"]"#).unwrap();
    let profile_link_sel = Selector::parse(r#"a[href^="/"]"#).unwrap();
    let time_sel = Selector::parse("time").unwrap();

    let base = Url::parse(SEARCH_BASE).expect("valid search base");

    let mut posts = Vec::new();
    for article in document.select(&article_sel) {
        let Some(href) = article
            .select(&status_link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Some(native_id) = status_id(href) else {
            continue;
        };

        let text = article
            .select(&text_sel)
            .next()
            .map(|div| {
                div.select(&span_sel)
                    .map(|span| span.text().collect::<String>())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
            .trim()
            .to_string();

        if !text::contains_keyword(&text, keyword) {
            continue;
        }

        let username = article
            .select(&user_sel)
            .next()
            .and_then(|div| div.select(&profile_link_sel).next())
            .map(|a| {
                a.text()
                    .collect::<String>()
                    .trim()
                    .trim_start_matches('@')
                    .to_string()
            })
            .unwrap_or_default();

        let created_at = article
            .select(&time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let url = base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string());

        posts.push(RawPost {
            native_id,
            text,
            url,
            created_at,
            username,
            subreddit: None,
        });
    }
    posts
}

/// The status id is the last path segment of a /status/ link.
fn status_id(href: &str) -> Option<String> {
    match href.rsplit_once('/') {
        Some((_, id)) if !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}
