//! Content fingerprints for file sets.
//!
//! The fingerprint is an MD5 digest over the concatenated text of every file
//! in the set, taken in sorted path order so directory listing order never
//! matters. Invalid UTF-8 is dropped before hashing, which means two files
//! that differ only in undecodable bytes share a fingerprint. That is a known
//! weakness of the cache key and is kept for compatibility with stores built
//! by earlier versions. File names are not part of the digest, and an empty
//! file contributes nothing to it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{BrainError, BrainResult};

/// Hex digest identifying the content of a file set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of `files`.
///
/// Fails on the first file that cannot be read; no partial digest is produced.
pub fn fingerprint<P: AsRef<Path>>(files: &[P]) -> BrainResult<Fingerprint> {
    let mut sorted: Vec<PathBuf> = files.iter().map(|p| p.as_ref().to_path_buf()).collect();
    sorted.sort();

    let mut context = md5::Context::new();
    for path in &sorted {
        let bytes = std::fs::read(path).map_err(|source| BrainError::Io {
            path: path.clone(),
            source,
        })?;
        for chunk in bytes.utf8_chunks() {
            context.consume(chunk.valid().as_bytes());
        }
    }

    Ok(Fingerprint(format!("{:x}", context.compute())))
}
