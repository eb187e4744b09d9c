use async_trait::async_trait;
use or_core::{ContentSource, Error, Result, SourceKind};
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::FetchConfig;
use crate::logging::Logger;
use super::{utils, Fetcher};

/// One way of retrieving a thread. Strategies are tried in order and the
/// first success wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedditStrategy {
    Json(String),
    Html(String),
}

impl RedditStrategy {
    fn endpoint(&self, post_id: &str) -> String {
        match self {
            RedditStrategy::Json(template) | RedditStrategy::Html(template) => {
                template.replace("{id}", post_id)
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RedditStrategy::Json(_) => "json",
            RedditStrategy::Html(_) => "html",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedditThread {
    pub title: String,
    pub selftext: String,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RedditFetcher {
    client: Client,
    config: Arc<FetchConfig>,
    strategies: Vec<RedditStrategy>,
    logger: Logger,
}

impl RedditFetcher {
    pub fn new(config: Arc<FetchConfig>) -> Result<Self> {
        let mut strategies: Vec<RedditStrategy> = config
            .reddit_json_mirrors
            .iter()
            .cloned()
            .map(RedditStrategy::Json)
            .collect();
        strategies.push(RedditStrategy::Html(config.reddit_html_page.clone()));

        Ok(Self {
            client: config.http_client()?,
            config,
            strategies,
            logger: Logger::new().with_prefix("[reddit]"),
        })
    }

    pub fn strategies(&self) -> &[RedditStrategy] {
        &self.strategies
    }

    /// Post id from `/comments/<id>`, `/r/<sub>/comments/<id>/<slug>` or `redd.it/<id>`.
    pub fn post_id(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

        let candidate = if host == "redd.it" || host.ends_with(".redd.it") {
            segments.first().copied()
        } else {
            segments
                .iter()
                .position(|s| *s == "comments")
                .and_then(|i| segments.get(i + 1).copied())
        }?;

        if candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(candidate.to_lowercase())
        } else {
            None
        }
    }

    pub fn is_search_url(url: &str) -> bool {
        Url::parse(url)
            .map(|u| {
                let path = u.path();
                path.contains("/search/") || path.trim_end_matches('/').ends_with("/search")
            })
            .unwrap_or(false)
    }

    async fn run_strategy(&self, strategy: &RedditStrategy, post_id: &str) -> Result<RedditThread> {
        let endpoint = strategy.endpoint(post_id);
        let response = self.client.get(&endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(endpoint, Some(status.as_u16()), "mirror returned an error status"));
        }
        let body = response.text().await?;

        let thread = match strategy {
            RedditStrategy::Json(_) => {
                let value: Value = serde_json::from_str(&body)?;
                parse_listing(&value, self.config.max_comments)
            }
            RedditStrategy::Html(_) => parse_thread_page(&body, self.config.max_comments),
        };

        thread.ok_or_else(|| Error::fetch(endpoint, Some(status.as_u16()), "no post found in response"))
    }

    fn to_source(&self, url: &str, thread: RedditThread) -> ContentSource {
        let mut paragraphs = utils::split_into_paragraphs(&thread.selftext);
        paragraphs.extend(thread.comments.iter().map(|c| c.as_str()));

        let mut body_text = thread.selftext.trim().to_string();
        for comment in &thread.comments {
            if !body_text.is_empty() {
                body_text.push_str("\n\n");
            }
            body_text.push_str(comment.trim());
        }

        ContentSource {
            kind: SourceKind::Reddit,
            url: url.to_string(),
            markup: utils::render_markup(&thread.title, paragraphs),
            title: thread.title,
            body_text,
            meta_description: None,
        }
    }
}

/// Reads a `[post listing, comment listing]` JSON response.
pub fn parse_listing(value: &Value, max_comments: usize) -> Option<RedditThread> {
    let listings = value.as_array()?;
    let post = listings
        .first()?
        .pointer("/data/children/0/data")?;
    let title = post.get("title")?.as_str()?.trim().to_string();
    if title.is_empty() {
        return None;
    }
    let selftext = post
        .get("selftext")
        .and_then(|s| s.as_str())
        .unwrap_or_default()
        .to_string();

    let comments = listings
        .get(1)
        .and_then(|l| l.pointer("/data/children"))
        .and_then(|c| c.as_array())
        .map(|children| {
            children
                .iter()
                .filter(|child| child.get("kind").and_then(|k| k.as_str()) == Some("t1"))
                .filter_map(|child| child.pointer("/data/body").and_then(|b| b.as_str()))
                .map(|body| body.trim().to_string())
                .filter(|body| !body.is_empty())
                .take(max_comments)
                .collect()
        })
        .unwrap_or_default();

    Some(RedditThread { title, selftext, comments })
}

/// Scrapes an old-style thread page.
pub fn parse_thread_page(html: &str, max_comments: usize) -> Option<RedditThread> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("a.title").ok()?;
    let body_selector = Selector::parse(".expando .md").ok()?;
    let comment_selector = Selector::parse(".commentarea .entry .md").ok()?;

    let text_of = |el: scraper::ElementRef| el.text().collect::<Vec<_>>().join(" ").trim().to_string();

    let title = document.select(&title_selector).next().map(text_of)?;
    if title.is_empty() {
        return None;
    }
    let selftext = document
        .select(&body_selector)
        .next()
        .map(text_of)
        .unwrap_or_default();
    let comments = document
        .select(&comment_selector)
        .map(text_of)
        .filter(|c| !c.is_empty())
        .take(max_comments)
        .collect();

    Some(RedditThread { title, selftext, comments })
}

#[async_trait]
impl Fetcher for RedditFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    fn can_handle(&self, url: &str) -> bool {
        SourceKind::from_url(url) == SourceKind::Reddit
    }

    async fn fetch(&self, url: &str) -> Result<ContentSource> {
        if Self::is_search_url(url) {
            self.logger.info(&format!("🔎 search results page, skipping post fetch: {}", url));
            return Ok(ContentSource {
                kind: SourceKind::Reddit,
                url: url.to_string(),
                title: "Reddit search results".to_string(),
                body_text: String::new(),
                markup: String::new(),
                meta_description: None,
            });
        }

        let post_id = Self::post_id(url)
            .ok_or_else(|| Error::InvalidSource(format!("No Reddit post id in URL: {}", url)))?;
        let logger = self.logger.clone().with_prefix(format!("[{}]", post_id));
        let total = self.strategies.len() as u32;

        let mut last_error = None;
        for (i, strategy) in self.strategies.iter().enumerate() {
            match self.run_strategy(strategy, &post_id).await {
                Ok(thread) => {
                    logger.attempt(i as u32 + 1, total, &format!(
                        "✅ {} strategy returned {} comments",
                        strategy.label(),
                        thread.comments.len()
                    ));
                    return Ok(self.to_source(url, thread));
                }
                Err(e) => {
                    logger.attempt(i as u32 + 1, total, &format!("⚠️ {} strategy failed: {}", strategy.label(), e));
                    last_error = Some(e);
                }
            }
        }

        let last_status = match &last_error {
            Some(Error::Fetch { last_status, .. }) => *last_status,
            _ => None,
        };
        Err(Error::fetch(
            url,
            last_status,
            format!(
                "all {} Reddit strategies failed: {}",
                total,
                last_error.map(|e| e.to_string()).unwrap_or_default()
            ),
        ))
    }
}
