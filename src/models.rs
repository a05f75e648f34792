//! Core data models shared by the store, the coordinator, and the chat session.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// A persisted record describing a brain built over one file set.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    /// `"{namespace}_{fingerprint}"`.
    pub id: String,
    pub name: String,
    /// Set by the store when the record is written; ignored on `put`.
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
    pub files: Vec<PathBuf>,
    /// Opaque engine payload. `None` when the engine exposes nothing to persist.
    pub serialized_index: Option<Vec<u8>>,
}

impl IndexRecord {
    /// A fresh record, to be stamped by the store on `put`.
    pub fn new(namespace: &str, fingerprint: &str, files: Vec<PathBuf>) -> Self {
        Self {
            id: record_id(namespace, fingerprint),
            name: namespace.to_string(),
            created_at: Utc::now(),
            fingerprint: fingerprint.to_string(),
            files,
            serialized_index: None,
        }
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// Listing row returned by `list_all`: no file list, no payload.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
}

pub fn record_id(namespace: &str, fingerprint: &str) -> String {
    format!("{}_{}", namespace, fingerprint)
}

/// Fixed settings a brain answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct BrainSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub parser: String,
}

impl Default for BrainSettings {
    fn default() -> Self {
        Self {
            model: "claude-3-sonnet-20240229".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            parser: "simple".to_string(),
        }
    }
}
