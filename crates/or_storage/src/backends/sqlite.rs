use async_trait::async_trait;
use chrono::{DateTime, Utc};
use or_core::{CachedTranscript, Error, Result, TranscriptCache};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePool}, Row};
use std::path::{Path, PathBuf};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS transcripts (
        video_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        transcript TEXT NOT NULL,
        cached_at TEXT NOT NULL
    )
    "#,
];

fn storage_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

/// Transcript cache persisted in a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteCache {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to open transcript database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl TranscriptCache for SqliteCache {
    async fn get(&self, video_id: &str) -> Result<Option<CachedTranscript>> {
        let row = sqlx::query(
            "SELECT video_id, title, description, transcript, cached_at FROM transcripts WHERE video_id = ?",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to read transcript", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let cached_at: String = row.get("cached_at");
        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map_err(|e| storage_error("Failed to parse cache timestamp", e))?
            .with_timezone(&Utc);

        Ok(Some(CachedTranscript {
            video_id: row.get("video_id"),
            title: row.get("title"),
            description: row.get("description"),
            transcript: row.get("transcript"),
            cached_at,
        }))
    }

    async fn put(&self, transcript: &CachedTranscript) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO transcripts
            (video_id, title, description, transcript, cached_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transcript.video_id)
        .bind(&transcript.title)
        .bind(&transcript.description)
        .bind(&transcript.transcript)
        .bind(transcript.cached_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to store transcript", e))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteCache {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at the configured path"
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
