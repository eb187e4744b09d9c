use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTranscript {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub transcript: String,
    pub cached_at: DateTime<Utc>,
}

/// Persistent key-value store for video transcripts, keyed by video id.
///
/// Reads and writes are not coordinated across concurrent requests for the
/// same id, so the last writer wins. That is only sound while the cached
/// transcript is a pure function of the video's title and description.
#[async_trait]
pub trait TranscriptCache: Send + Sync {
    /// Look up a transcript by video id
    async fn get(&self, video_id: &str) -> Result<Option<CachedTranscript>>;

    /// Insert or replace a transcript
    async fn put(&self, transcript: &CachedTranscript) -> Result<()>;
}
