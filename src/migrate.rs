use sqlx::SqlitePool;

use crate::error::BrainResult;

/// Create the `brain_data` table if it is missing.
///
/// The column layout matches stores written by earlier releases at the same
/// path: `hash` holds the fingerprint, `embedding` the serialized index, and
/// `created_at` is Unix seconds as REAL.
pub async fn run_migrations(pool: &SqlitePool) -> BrainResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS brain_data (
            id TEXT PRIMARY KEY,
            name TEXT,
            created_at REAL,
            hash TEXT,
            files TEXT,
            embedding BLOB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_brain_data_hash ON brain_data(hash)")
        .execute(pool)
        .await?;

    Ok(())
}
