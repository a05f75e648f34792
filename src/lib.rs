//! # Repo Brain
//!
//! A repository-scoped question-answering assistant with a content-addressed
//! index cache.
//!
//! Documents under `<repo>/policies` are fingerprinted, the fingerprint is
//! looked up in a local SQLite store, and an external document-QA engine is
//! asked to build a brain over the file list. Repeated runs over unchanged
//! documents hit the cache and reuse the recorded file set.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Discovery │──▶│ Fingerprint │──▶│ IndexStore  │
//! │ policies/ │   │    (md5)    │   │  (SQLite)   │
//! └───────────┘   └─────────────┘   └──────┬──────┘
//!                                          │ hit / miss
//!                                          ▼
//!                 ┌─────────────┐   ┌─────────────┐
//!                 │ ChatSession │◀──│ Coordinator │──▶ Engine (HTTP)
//!                 │   (REPL)    │   └─────────────┘
//!                 └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Records, summaries, and brain settings |
//! | [`discovery`] | Eligible file collection |
//! | [`fingerprint`] | Content digest of a file set |
//! | [`store`] | Index store trait, SQLite and in-memory backends |
//! | [`engine`] | External engine interface and HTTP client |
//! | [`coordinator`] | Cache hit/miss resolution into a brain handle |
//! | [`session`] | Interactive chat loop |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod coordinator;
pub mod db;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod session;
pub mod store;
