use async_trait::async_trait;
use or_core::{ContentSource, Error, Result, SourceKind};
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::logging::Logger;
use crate::retry::parse_retry_after;
use super::{utils, Fetcher};

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    objects: Vec<ExtractedObject>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractedObject {
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    html: String,
    #[serde(default)]
    meta: Option<ExtractedMeta>,
}

#[derive(Debug, Deserialize)]
struct ExtractedMeta {
    #[serde(default)]
    description: Option<String>,
}

impl ExtractedObject {
    fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.html.trim().is_empty()
    }
}

/// What to do after one extraction attempt.
enum Attempt {
    Done(ContentSource),
    Retry { delay: Duration, reason: String },
    Fail(Error),
}

/// Generic web article fetcher backed by a content-extraction API.
#[derive(Debug, Clone)]
pub struct ArticleFetcher {
    client: Client,
    config: Arc<FetchConfig>,
    logger: Logger,
}

impl ArticleFetcher {
    pub fn new(config: Arc<FetchConfig>) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            config,
            logger: Logger::new().with_prefix("[article]"),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/article", self.config.extraction_base_url.trim_end_matches('/'))
    }

    async fn attempt(&self, url: &str, token: &str, attempt: u32, last_status: &mut Option<u16>) -> Attempt {
        let policy = &self.config.retry;
        let response = match self
            .client
            .get(self.endpoint())
            .query(&[("token", token), ("url", url)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry {
                    delay: policy.backoff(attempt),
                    reason: format!("request error: {}", e),
                }
            }
        };

        let status = response.status();
        *last_status = Some(status.as_u16());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Attempt::Retry {
                delay: policy.delay_for(attempt, retry_after),
                reason: format!("rate limited (retry-after: {:?})", retry_after),
            };
        }
        if status.is_server_error() {
            return Attempt::Retry {
                delay: policy.backoff(attempt),
                reason: format!("server error {}", status),
            };
        }
        if !status.is_success() {
            return Attempt::Fail(Error::fetch(
                url,
                Some(status.as_u16()),
                format!("extraction API rejected the request with {}", status),
            ));
        }

        let payload = match response.json::<ExtractionResponse>().await {
            Ok(payload) => payload,
            Err(e) => {
                return Attempt::Retry {
                    delay: policy.backoff(attempt),
                    reason: format!("malformed extraction payload: {}", e),
                }
            }
        };

        match payload.objects.into_iter().find(ExtractedObject::has_content) {
            Some(object) => Attempt::Done(ContentSource {
                kind: SourceKind::Article,
                url: url.to_string(),
                title: object.title.trim().to_string(),
                body_text: object.text,
                markup: object.html,
                meta_description: object.meta.and_then(|m| m.description),
            }),
            None => Attempt::Retry {
                delay: policy.backoff(attempt),
                reason: payload
                    .error
                    .unwrap_or_else(|| "extraction returned no content".to_string()),
            },
        }
    }
}

#[async_trait]
impl Fetcher for ArticleFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Article
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::parse_url(url).is_ok()
    }

    async fn fetch(&self, url: &str) -> Result<ContentSource> {
        let token = self
            .config
            .extraction_token
            .as_deref()
            .ok_or_else(|| Error::Config("extraction API token is not configured".to_string()))?;
        let max_attempts = self.config.retry.max_attempts.max(1);
        let logger = self.logger.clone().with_prefix(format!("[{}]", url));

        let mut last_status = None;
        let mut last_reason = String::new();

        for attempt in 0..max_attempts {
            match self.attempt(url, token, attempt, &mut last_status).await {
                Attempt::Done(source) => {
                    logger.attempt(attempt + 1, max_attempts, &format!("✅ extracted {} chars", source.body_text.len()));
                    return Ok(source);
                }
                Attempt::Fail(e) => {
                    logger.attempt(attempt + 1, max_attempts, &format!("❌ {}", e));
                    return Err(e);
                }
                Attempt::Retry { delay, reason } => {
                    if attempt + 1 < max_attempts {
                        logger.attempt(attempt + 1, max_attempts, &format!("⏳ {}; retrying in {:?}", reason, delay));
                        tokio::time::sleep(delay).await;
                    } else {
                        logger.attempt(attempt + 1, max_attempts, &format!("❌ {}; giving up", reason));
                    }
                    last_reason = reason;
                }
            }
        }

        Err(Error::fetch(
            url,
            last_status,
            format!("no usable content after {} attempts: {}", max_attempts, last_reason),
        ))
    }
}
