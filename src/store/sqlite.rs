//! SQLite-backed [`IndexStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

use super::{write_stamp, IndexStore};
use crate::db;
use crate::error::{BrainError, BrainResult};
use crate::migrate;
use crate::models::{IndexRecord, IndexSummary};

/// SQLite implementation of [`IndexStore`] over the `brain_data` table.
///
/// Columns keep the layout of earlier releases so existing store files stay
/// readable: `hash` backs [`IndexRecord::fingerprint`], `embedding` backs
/// [`IndexRecord::serialized_index`], and `created_at` is REAL Unix seconds.
///
/// Holds one pool for the lifetime of the process. Call [`close`](Self::close)
/// before exiting so the WAL is checkpointed.
pub struct SqliteIndexStore {
    pool: SqlitePool,
}

impl SqliteIndexStore {
    /// Open (creating if needed) the store file at `path` and ensure the schema.
    pub async fn open(path: &Path) -> BrainResult<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        tracing::debug!(path = %path.display(), "index store opened");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const SUMMARY_COLUMNS: &str = "id, COALESCE(name, '') AS name, created_at, COALESCE(hash, '') AS hash";

fn encode_created_at(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

fn decode_created_at(secs: f64) -> BrainResult<DateTime<Utc>> {
    let invalid = || BrainError::Store(format!("invalid created_at value: {}", secs));
    if !secs.is_finite() {
        return Err(invalid());
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64).ok_or_else(invalid)
}

fn row_to_summary(row: &SqliteRow) -> BrainResult<IndexSummary> {
    Ok(IndexSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: decode_created_at(row.try_get("created_at")?)?,
        fingerprint: row.try_get("hash")?,
    })
}

#[async_trait]
impl IndexStore for SqliteIndexStore {
    async fn put(&self, record: &IndexRecord) -> BrainResult<()> {
        let files: Vec<String> = record
            .files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let files_json = serde_json::to_string(&files)
            .map_err(|e| BrainError::Store(format!("failed to encode file list: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO brain_data (id, name, created_at, hash, files, embedding)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                created_at = excluded.created_at,
                hash = excluded.hash,
                files = excluded.files,
                embedding = excluded.embedding
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(encode_created_at(write_stamp()))
        .bind(&record.fingerprint)
        .bind(&files_json)
        .bind(&record.serialized_index)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> BrainResult<Option<IndexRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {}, files, embedding FROM brain_data WHERE id = ?",
            SUMMARY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let summary = row_to_summary(&row)?;
        let files_json: Option<String> = row.try_get("files")?;
        let files_json = files_json.ok_or_else(|| {
            BrainError::Store(format!("missing file list for {}", summary.id))
        })?;
        let files: Vec<String> = serde_json::from_str(&files_json).map_err(|e| {
            BrainError::Store(format!("corrupt file list for {}: {}", summary.id, e))
        })?;

        Ok(Some(IndexRecord {
            id: summary.id,
            name: summary.name,
            created_at: summary.created_at,
            fingerprint: summary.fingerprint,
            files: files.into_iter().map(PathBuf::from).collect(),
            serialized_index: row.try_get("embedding")?,
        }))
    }

    async fn list_all(&self) -> BrainResult<Vec<IndexSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM brain_data ORDER BY rowid",
            SUMMARY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_summary).collect()
    }
}
