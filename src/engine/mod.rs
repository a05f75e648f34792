//! Capability interface to the external document-QA engine.
//!
//! The cache layer never indexes, embeds, or prompts anything itself. It
//! hands a file list to an [`Engine`] and gets back a live [`Brain`] that
//! can answer questions. Settings are passed with every question instead of
//! being written into the engine after the fact.
//!
//! ```text
//!   Coordinator ──build_index(name, files)──▶ Engine
//!        │                                      │
//!        ◀──────────── Box<dyn Brain> ──────────┘
//!        │
//!   ChatSession ──answer(question, settings)──▶ Brain
//! ```

pub mod http;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::BrainResult;
use crate::models::BrainSettings;

pub use http::HttpEngine;

/// Builds brains from document files.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Build a ready-to-query brain over `files`.
    ///
    /// May take a long time; there is no timeout.
    async fn build_index(&self, name: &str, files: &[PathBuf]) -> BrainResult<Box<dyn Brain>>;
}

/// A live, queryable index produced by an [`Engine`].
#[async_trait]
pub trait Brain: Send + Sync {
    async fn answer(&self, question: &str, settings: &BrainSettings) -> BrainResult<String>;

    /// One-line engine-side description, shown by `info`.
    fn describe(&self) -> String;
}
