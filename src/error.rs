//! Error taxonomy for the cache and chat layers.
//!
//! [`BrainError`] covers everything that can go wrong while resolving a
//! brain or answering a question. The binary wraps these in `anyhow` only
//! at the outermost layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by discovery, fingerprinting, storage, and the engine.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The corpus directory is missing or holds no eligible files.
    #[error("no content: {0}")]
    Discovery(String),

    /// A corpus file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index store is unavailable or returned corrupt data.
    #[error("index store error: {0}")]
    Store(String),

    /// The external engine failed to build an index or answer a question.
    #[error("engine error: {0}")]
    Engine(String),
}

impl From<sqlx::Error> for BrainError {
    fn from(err: sqlx::Error) -> Self {
        BrainError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for BrainError {
    fn from(err: reqwest::Error) -> Self {
        BrainError::Engine(err.to_string())
    }
}

pub type BrainResult<T> = std::result::Result<T, BrainError>;
