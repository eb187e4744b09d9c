use async_trait::async_trait;
use chrono::Utc;
use or_core::{CachedTranscript, ContentSource, Error, Result, SourceKind, TranscriptCache};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::config::FetchConfig;
use crate::logging::Logger;
use super::{utils, Fetcher};

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Builds a content source from a video's title and description, cached by video id.
pub struct YouTubeFetcher {
    client: Client,
    config: Arc<FetchConfig>,
    cache: Arc<dyn TranscriptCache>,
    logger: Logger,
}

impl YouTubeFetcher {
    pub fn new(config: Arc<FetchConfig>, cache: Arc<dyn TranscriptCache>) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            config,
            cache,
            logger: Logger::new().with_prefix("[youtube]"),
        })
    }

    pub fn video_id(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let candidate = if host == "youtu.be" {
            segments.first().map(|s| s.to_string())
        } else if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
            Some(v.into_owned())
        } else {
            segments
                .windows(2)
                .find(|pair| matches!(pair[0], "embed" | "v" | "watch" | "shorts"))
                .map(|pair| pair[1].to_string())
        }?;

        let valid = !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then_some(candidate)
    }

    fn to_source(url: &str, title: &str, transcript: &str) -> ContentSource {
        ContentSource {
            kind: SourceKind::YouTube,
            url: url.to_string(),
            title: title.to_string(),
            body_text: transcript.to_string(),
            markup: utils::render_markup(title, utils::split_into_paragraphs(transcript)),
            meta_description: None,
        }
    }

    async fn fetch_snippet(&self, video_id: &str, url: &str) -> Result<VideoSnippet> {
        let key = self
            .config
            .youtube_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("YouTube API key is not configured".to_string()))?;
        let endpoint = format!("{}/videos", self.config.youtube_base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&endpoint)
            .query(&[("part", "snippet"), ("id", video_id), ("key", key)])
            .send()
            .await
            .map_err(|e| Error::fetch(url, None, format!("video metadata request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, Some(status.as_u16()), format!("video metadata API returned {}", status)));
        }

        let payload: VideoListResponse = response
            .json()
            .await
            .map_err(|e| Error::fetch(url, Some(status.as_u16()), format!("malformed video metadata: {}", e)))?;
        payload
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| Error::fetch(url, Some(status.as_u16()), "video not found"))
    }
}

#[async_trait]
impl Fetcher for YouTubeFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::YouTube
    }

    fn can_handle(&self, url: &str) -> bool {
        SourceKind::from_url(url) == SourceKind::YouTube
    }

    async fn fetch(&self, url: &str) -> Result<ContentSource> {
        let video_id = Self::video_id(url)
            .ok_or_else(|| Error::InvalidSource(format!("No YouTube video id in URL: {}", url)))?;
        let logger = self.logger.clone().with_prefix(format!("[{}]", video_id));

        match self.cache.get(&video_id).await {
            Ok(Some(cached)) => {
                logger.info("📦 transcript cache hit");
                return Ok(Self::to_source(url, &cached.title, &cached.transcript));
            }
            Ok(None) => logger.debug("transcript cache miss"),
            Err(e) => logger.warn(&format!("⚠️ transcript cache read failed: {}", e)),
        }

        let snippet = self.fetch_snippet(&video_id, url).await?;
        let transcript = format!("{}\n\n{}", snippet.title, snippet.description);

        let entry = CachedTranscript {
            video_id: video_id.clone(),
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            transcript: transcript.clone(),
            cached_at: Utc::now(),
        };
        if let Err(e) = self.cache.put(&entry).await {
            logger.warn(&format!("⚠️ failed to cache transcript: {}", e));
        }

        logger.info(&format!("🎬 built fallback transcript ({} chars)", transcript.len()));
        Ok(Self::to_source(url, &snippet.title, &transcript))
    }
}
