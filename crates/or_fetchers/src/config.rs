use std::time::Duration;
use crate::retry::RetryPolicy;

pub const DEFAULT_USER_AGENT: &str = "outrank/0.1 (content research; +https://github.com/outrank)";

/// Endpoints, credentials and retry settings shared by all fetchers.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub extraction_base_url: String,
    pub extraction_token: Option<String>,
    pub youtube_base_url: String,
    pub youtube_api_key: Option<String>,
    /// JSON endpoints tried in order; `{id}` is replaced by the post id.
    pub reddit_json_mirrors: Vec<String>,
    /// HTML page scraped when every JSON mirror fails.
    pub reddit_html_page: String,
    pub max_comments: usize,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            extraction_base_url: "https://api.diffbot.com/v3".to_string(),
            extraction_token: None,
            youtube_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            youtube_api_key: None,
            reddit_json_mirrors: vec![
                "https://www.reddit.com/comments/{id}.json".to_string(),
                "https://old.reddit.com/comments/{id}.json".to_string(),
                "https://api.reddit.com/comments/{id}".to_string(),
            ],
            reddit_html_page: "https://old.reddit.com/comments/{id}".to_string(),
            max_comments: 10,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_extraction_token(mut self, token: Option<String>) -> Self {
        self.extraction_token = token;
        self
    }

    pub fn with_youtube_api_key(mut self, key: Option<String>) -> Self {
        self.youtube_api_key = key;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn http_client(&self) -> or_core::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(&self.user_agent)
            .build()?)
    }
}
