use async_trait::async_trait;
use or_core::{CachedTranscript, Result, TranscriptCache};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

/// Process-local transcript cache; contents are lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CachedTranscript>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TranscriptCache for MemoryCache {
    async fn get(&self, video_id: &str) -> Result<Option<CachedTranscript>> {
        Ok(self.entries.read().await.get(video_id).cloned())
    }

    async fn put(&self, transcript: &CachedTranscript) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(transcript.video_id.clone(), transcript.clone());
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryCache {
    fn get_error_message() -> &'static str {
        "Memory cache should be available"
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
