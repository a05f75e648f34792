//! In-memory [`IndexStore`] for tests and short-lived embedding.
//!
//! Records live in a `Vec` behind a `RwLock`, which preserves insertion order
//! for `list_all` the same way SQLite's rowid does.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{write_stamp, IndexStore};
use crate::error::BrainResult;
use crate::models::{IndexRecord, IndexSummary};

#[derive(Default)]
pub struct InMemoryIndexStore {
    records: RwLock<Vec<IndexRecord>>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn put(&self, record: &IndexRecord) -> BrainResult<()> {
        let mut stored = record.clone();
        stored.created_at = write_stamp();

        let mut records = self.records.write().unwrap();
        match records.iter_mut().find(|r| r.id == stored.id) {
            Some(existing) => *existing = stored,
            None => records.push(stored),
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> BrainResult<Option<IndexRecord>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_all(&self) -> BrainResult<Vec<IndexSummary>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().map(IndexRecord::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn upsert_replaces_in_place() {
        let store = InMemoryIndexStore::new();
        let first = IndexRecord::new("ns", "one", vec![PathBuf::from("a.txt")]);
        let second = IndexRecord::new("ns", "two", vec![PathBuf::from("b.txt")]);
        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();

        let mut replacement = first.clone();
        replacement.files = vec![PathBuf::from("c.txt")];
        store.put(&replacement).await.unwrap();

        assert_eq!(store.len(), 2);
        let ids: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["ns_one", "ns_two"]);
        let loaded = store.get("ns_one").await.unwrap().unwrap();
        assert_eq!(loaded.files, vec![PathBuf::from("c.txt")]);
    }

    #[tokio::test]
    async fn put_stamps_write_time() {
        let store = InMemoryIndexStore::new();
        let mut record = IndexRecord::new("ns", "one", vec![]);
        record.created_at = chrono::DateTime::from_timestamp(0, 0).unwrap();
        store.put(&record).await.unwrap();

        let loaded = store.get("ns_one").await.unwrap().unwrap();
        assert!(loaded.created_at.timestamp() > 0);
    }
}
