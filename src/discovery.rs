//! Corpus discovery: which files under a repository feed the brain.
//!
//! Only the top level of `<root>/<corpus.subdir>` is scanned. A file is
//! eligible when its extension is in the configured allow-list.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CorpusConfig;
use crate::error::{BrainError, BrainResult};

/// Collect eligible files under `root/<subdir>`, sorted by path.
///
/// Paths are `root` joined with the entry name, so an absolute root yields
/// absolute paths. A missing directory or an empty result is a
/// [`BrainError::Discovery`].
pub fn discover_files(root: &Path, corpus: &CorpusConfig) -> BrainResult<Vec<PathBuf>> {
    let dir = root.join(&corpus.subdir);
    if !dir.is_dir() {
        return Err(BrainError::Discovery(format!(
            "corpus directory not found: {}",
            dir.display()
        )));
    }

    let allowed = build_extension_set(&corpus.extensions)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
            match e.into_io_error() {
                Some(source) => BrainError::Io { path, source },
                None => BrainError::Discovery(format!("failed to scan {}", path.display())),
            }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        if allowed.is_match(entry.file_name()) {
            files.push(dir.join(entry.file_name()));
        }
    }

    if files.is_empty() {
        return Err(BrainError::Discovery(format!(
            "no files matching [{}] in {}",
            corpus.extensions.join(", "),
            dir.display()
        )));
    }

    files.sort();
    Ok(files)
}

fn build_extension_set(extensions: &[String]) -> BrainResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        let glob = Glob::new(&format!("*.{}", ext))
            .map_err(|e| BrainError::Discovery(format!("invalid extension '{}': {}", ext, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| BrainError::Discovery(format!("invalid extension set: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> CorpusConfig {
        CorpusConfig::default()
    }

    #[test]
    fn collects_allowed_extensions_sorted() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("policies");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.txt"), "b").unwrap();
        fs::write(dir.join("a.pdf"), "a").unwrap();
        fs::write(dir.join("c.docx"), "c").unwrap();
        fs::write(dir.join("notes.md"), "skip").unwrap();
        fs::write(dir.join("txt"), "no extension").unwrap();

        let files = discover_files(tmp.path(), &corpus()).unwrap();
        assert_eq!(
            files,
            vec![dir.join("a.pdf"), dir.join("b.txt"), dir.join("c.docx")]
        );
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("policies");
        fs::create_dir_all(dir.join("archive")).unwrap();
        fs::write(dir.join("top.txt"), "top").unwrap();
        fs::write(dir.join("archive").join("old.txt"), "old").unwrap();

        let files = discover_files(tmp.path(), &corpus()).unwrap();
        assert_eq!(files, vec![dir.join("top.txt")]);
    }

    #[test]
    fn missing_directory_is_discovery_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover_files(tmp.path(), &corpus()).unwrap_err();
        assert!(matches!(err, BrainError::Discovery(_)));
    }

    #[test]
    fn no_eligible_files_is_discovery_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("policies");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("readme.md"), "nope").unwrap();

        let err = discover_files(tmp.path(), &corpus()).unwrap_err();
        assert!(matches!(err, BrainError::Discovery(_)));
    }

    #[test]
    fn extensions_accept_leading_dot() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("docs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("guide.md"), "guide").unwrap();

        let corpus = CorpusConfig {
            subdir: "docs".to_string(),
            extensions: vec![".md".to_string()],
        };
        let files = discover_files(tmp.path(), &corpus).unwrap();
        assert_eq!(files, vec![dir.join("guide.md")]);
    }
}
