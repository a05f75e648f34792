//! Storage abstraction for built-brain records.
//!
//! The [`IndexStore`] trait is the durable key-value map the coordinator
//! consults before asking the engine to build anything. Records are keyed by
//! `"{namespace}_{fingerprint}"`, so a changed file set never overwrites the
//! record of an earlier one. Nothing is ever evicted.
//!
//! | Implementation | Backing |
//! |----------------|---------|
//! | [`SqliteIndexStore`] | single SQLite file, opened once per process |
//! | [`InMemoryIndexStore`] | `RwLock<Vec<_>>`, for tests and embedding |

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BrainResult;
use crate::models::{IndexRecord, IndexSummary};

pub use memory::InMemoryIndexStore;
pub use sqlite::SqliteIndexStore;

/// Durable mapping from record id to [`IndexRecord`].
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put`](IndexStore::put) | Atomic upsert by id; stamps `created_at` |
/// | [`get`](IndexStore::get) | Exact-key lookup of a full record |
/// | [`list_all`](IndexStore::list_all) | Metadata of every record, insertion order |
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Insert or replace the record with `record.id`.
    ///
    /// The caller's `created_at` is ignored; the store records the write time.
    async fn put(&self, record: &IndexRecord) -> BrainResult<()>;

    /// Fetch the record with the given id, including files and payload.
    async fn get(&self, id: &str) -> BrainResult<Option<IndexRecord>>;

    /// Lightweight listing without file lists or payloads.
    async fn list_all(&self) -> BrainResult<Vec<IndexSummary>>;
}

/// Write time at the store's millisecond resolution.
pub(crate) fn write_stamp() -> DateTime<Utc> {
    let millis = Utc::now().timestamp_millis();
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}
