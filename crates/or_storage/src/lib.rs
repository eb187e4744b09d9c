use async_trait::async_trait;
use or_core::{Error, Result, TranscriptCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: TranscriptCache {
    fn get_error_message() -> &'static str
    where
        Self: Sized;

    /// Human-readable name used in logs and `--cache`
    fn name(&self) -> &'static str;
}

/// Backend selection as accepted by `--cache`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    Sqlite(PathBuf),
}

impl CacheKind {
    pub const DEFAULT_SQLITE_PATH: &'static str = "transcripts.db";

    pub fn parse(name: &str, path: Option<&Path>) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite(
                path.map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_SQLITE_PATH)),
            )),
            other => Err(Error::Config(format!("Unknown cache backend: {}", other))),
        }
    }
}

pub async fn create_cache(kind: CacheKind) -> Result<Arc<dyn TranscriptCache>> {
    match kind {
        CacheKind::Memory => {
            let cache = MemoryCache::new();
            tracing::info!("📦 Using {} transcript cache", cache.name());
            Ok(Arc::new(cache))
        }
        #[cfg(feature = "sqlite")]
        CacheKind::Sqlite(path) => {
            let cache = SqliteCache::new_with_path(&path).await.map_err(|e| {
                tracing::error!("❌ {}: {}", SqliteCache::get_error_message(), e);
                e
            })?;
            tracing::info!("📦 Using {} transcript cache at {}", cache.name(), path.display());
            Ok(Arc::new(cache))
        }
        #[cfg(not(feature = "sqlite"))]
        CacheKind::Sqlite(_) => Err(Error::Config(
            "SQLite cache requested but or_storage was built without the `sqlite` feature".to_string(),
        )),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_cache, CacheKind, StorageBackend};
}
