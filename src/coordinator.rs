//! Index cache coordination.
//!
//! [`Coordinator::resolve`] turns a repository root into a ready
//! [`BrainHandle`]:
//!
//! ```text
//! Discovering ─▶ Fingerprinting ─▶ Lookup ─▶ StoreHit ─┐
//!                                           └▶ StoreMiss ┴▶ Building ─▶ (Storing) ─▶ Configuring ─▶ Ready
//!        (any stage) ──────────────────────────────────────────────────────────────────▶ Failed
//! ```
//!
//! `Storing` is only entered on a miss.
//!
//! On a hit the engine is still invoked, with the file list recorded in the
//! store rather than the freshly discovered one: the record's file set is
//! the unit of reproducibility. On a miss the engine builds from the
//! discovered files and a record is written afterwards, with no serialized
//! index since the engine does not expose one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CorpusConfig;
use crate::discovery::discover_files;
use crate::engine::{Brain, Engine};
use crate::error::{BrainError, BrainResult};
use crate::fingerprint::fingerprint;
use crate::models::{record_id, BrainSettings, IndexRecord};
use crate::store::IndexStore;

/// Stage of a single resolve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    Discovering,
    Fingerprinting,
    Lookup,
    StoreHit,
    StoreMiss,
    Building,
    Storing,
    Configuring,
    Ready,
}

impl fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolveStage::Discovering => "discovering",
            ResolveStage::Fingerprinting => "fingerprinting",
            ResolveStage::Lookup => "looking up",
            ResolveStage::StoreHit => "store-hit",
            ResolveStage::StoreMiss => "store-miss",
            ResolveStage::Building => "building",
            ResolveStage::Storing => "storing",
            ResolveStage::Configuring => "configuring",
            ResolveStage::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// A failed resolve: the stage it failed in and why.
#[derive(Debug, thiserror::Error)]
#[error("resolve failed while {stage}: {source}")]
pub struct ResolveError {
    pub stage: ResolveStage,
    #[source]
    pub source: BrainError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOutcome::Hit => f.write_str("hit"),
            CacheOutcome::Miss => f.write_str("miss"),
        }
    }
}

/// A configured brain, ready for questions. Never persisted.
pub struct BrainHandle {
    pub name: String,
    pub id: String,
    pub fingerprint: String,
    /// The file list the engine was given.
    pub files: Vec<PathBuf>,
    pub outcome: CacheOutcome,
    pub settings: BrainSettings,
    brain: Box<dyn Brain>,
}

impl BrainHandle {
    pub async fn answer(&self, question: &str) -> BrainResult<String> {
        self.brain.answer(question, &self.settings).await
    }

    pub fn describe(&self) -> String {
        self.brain.describe()
    }
}

impl fmt::Debug for BrainHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrainHandle")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("outcome", &self.outcome)
            .field("files", &self.files.len())
            .finish()
    }
}

pub struct Coordinator {
    store: Arc<dyn IndexStore>,
    engine: Arc<dyn Engine>,
    corpus: CorpusConfig,
    namespace: String,
    settings: BrainSettings,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn IndexStore>,
        engine: Arc<dyn Engine>,
        corpus: CorpusConfig,
        namespace: impl Into<String>,
        settings: BrainSettings,
    ) -> Self {
        Self {
            store,
            engine,
            corpus,
            namespace: namespace.into(),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    /// Resolve `root` into a configured brain.
    ///
    /// Every call runs the whole pipeline from discovery; nothing carries
    /// over between calls. Failures are logged here and returned with the
    /// stage they happened in.
    pub async fn resolve(&self, root: &Path) -> Result<BrainHandle, ResolveError> {
        let mut stage = ResolveStage::Discovering;
        let result = self.run(root, &mut stage).await;
        match result {
            Ok(handle) => {
                tracing::debug!(stage = %ResolveStage::Ready, id = %handle.id, "resolve finished");
                Ok(handle)
            }
            Err(source) => {
                tracing::error!(%stage, error = %source, "error initializing brain");
                Err(ResolveError { stage, source })
            }
        }
    }

    async fn run(&self, root: &Path, stage: &mut ResolveStage) -> BrainResult<BrainHandle> {
        enter(stage, ResolveStage::Discovering);
        let discovered = discover_files(root, &self.corpus)?;

        enter(stage, ResolveStage::Fingerprinting);
        let digest = fingerprint(&discovered)?;
        let id = record_id(&self.namespace, digest.as_str());

        enter(stage, ResolveStage::Lookup);
        let stored = self.store.get(&id).await?;

        let (outcome, files) = match stored {
            Some(record) => {
                enter(stage, ResolveStage::StoreHit);
                tracing::info!(%id, "[Storage Hit] found stored brain data");
                (CacheOutcome::Hit, record.files)
            }
            None => {
                enter(stage, ResolveStage::StoreMiss);
                tracing::info!(%id, "[Storage Miss] creating new brain");
                (CacheOutcome::Miss, discovered)
            }
        };

        enter(stage, ResolveStage::Building);
        let brain = self.engine.build_index(&self.namespace, &files).await?;

        if outcome == CacheOutcome::Miss {
            let record = IndexRecord::new(&self.namespace, digest.as_str(), files.clone());
            enter(stage, ResolveStage::Storing);
            self.store.put(&record).await?;
        }

        enter(stage, ResolveStage::Configuring);
        Ok(BrainHandle {
            name: self.namespace.clone(),
            id,
            fingerprint: digest.to_string(),
            files,
            outcome,
            settings: self.settings.clone(),
            brain,
        })
    }
}

fn enter(stage: &mut ResolveStage, next: ResolveStage) {
    *stage = next;
    tracing::debug!(stage = %next, "resolve stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexSummary;
    use crate::store::InMemoryIndexStore;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingEngine {
        builds: Mutex<Vec<Vec<PathBuf>>>,
        fail: bool,
    }

    struct EchoBrain;

    #[async_trait]
    impl Brain for EchoBrain {
        async fn answer(&self, question: &str, settings: &BrainSettings) -> BrainResult<String> {
            Ok(format!("{} via {}", question, settings.model))
        }

        fn describe(&self) -> String {
            "echo".to_string()
        }
    }

    #[async_trait]
    impl Engine for RecordingEngine {
        async fn build_index(&self, _name: &str, files: &[PathBuf]) -> BrainResult<Box<dyn Brain>> {
            self.builds.lock().unwrap().push(files.to_vec());
            if self.fail {
                return Err(BrainError::Engine("build exploded".to_string()));
            }
            Ok(Box::new(EchoBrain))
        }
    }

    fn coordinator(store: Arc<InMemoryIndexStore>, engine: Arc<RecordingEngine>) -> Coordinator {
        Coordinator::new(
            store,
            engine,
            CorpusConfig::default(),
            "repo_brain",
            BrainSettings::default(),
        )
    }

    fn repo_with(content: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("policies");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.txt"), content).unwrap();
        tmp
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let repo = repo_with("hello");
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let coord = coordinator(store.clone(), engine.clone());

        let first = coord.resolve(repo.path()).await.unwrap();
        assert_eq!(first.outcome, CacheOutcome::Miss);
        assert_eq!(first.id, "repo_brain_5d41402abc4b2a76b9719d911017c592");
        assert_eq!(store.len(), 1);

        let second = coord.resolve(repo.path()).await.unwrap();
        assert_eq!(second.outcome, CacheOutcome::Hit);
        assert_eq!(second.id, first.id);
        assert_eq!(store.len(), 1);
        assert_eq!(engine.builds.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn hit_builds_from_stored_file_list() {
        let repo = repo_with("hello");
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let coord = coordinator(store.clone(), engine.clone());

        let digest = fingerprint(&[repo.path().join("policies").join("a.txt")]).unwrap();
        let recorded = vec![PathBuf::from("/elsewhere/policies/a.txt")];
        store
            .put(&IndexRecord::new("repo_brain", digest.as_str(), recorded.clone()))
            .await
            .unwrap();

        let handle = coord.resolve(repo.path()).await.unwrap();
        assert_eq!(handle.outcome, CacheOutcome::Hit);
        assert_eq!(handle.files, recorded);
        assert_eq!(engine.builds.lock().unwrap()[0], recorded);
    }

    #[tokio::test]
    async fn missing_corpus_fails_in_discovery_without_writing() {
        let repo = TempDir::new().unwrap();
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let coord = coordinator(store.clone(), engine.clone());

        let err = coord.resolve(repo.path()).await.unwrap_err();
        assert_eq!(err.stage, ResolveStage::Discovering);
        assert!(matches!(err.source, BrainError::Discovery(_)));
        assert!(store.is_empty());
        assert!(engine.builds.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_build_writes_no_record() {
        let repo = repo_with("hello");
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine {
            fail: true,
            ..Default::default()
        });
        let coord = coordinator(store.clone(), engine);

        let err = coord.resolve(repo.path()).await.unwrap_err();
        assert_eq!(err.stage, ResolveStage::Building);
        assert!(matches!(err.source, BrainError::Engine(_)));
        assert!(store.is_empty());
    }

    /// Store whose reads or writes fail.
    struct BrokenStore {
        fail_get: bool,
    }

    #[async_trait]
    impl IndexStore for BrokenStore {
        async fn put(&self, _record: &IndexRecord) -> BrainResult<()> {
            Err(BrainError::Store("disk I/O error".to_string()))
        }

        async fn get(&self, _id: &str) -> BrainResult<Option<IndexRecord>> {
            if self.fail_get {
                return Err(BrainError::Store("database is locked".to_string()));
            }
            Ok(None)
        }

        async fn list_all(&self) -> BrainResult<Vec<IndexSummary>> {
            Ok(Vec::new())
        }
    }

    fn broken_coordinator(fail_get: bool, engine: Arc<RecordingEngine>) -> Coordinator {
        Coordinator::new(
            Arc::new(BrokenStore { fail_get }),
            engine,
            CorpusConfig::default(),
            "repo_brain",
            BrainSettings::default(),
        )
    }

    #[tokio::test]
    async fn store_read_failure_is_reported_as_lookup() {
        let repo = repo_with("hello");
        let engine = Arc::new(RecordingEngine::default());
        let coord = broken_coordinator(true, engine.clone());

        let err = coord.resolve(repo.path()).await.unwrap_err();
        assert_eq!(err.stage, ResolveStage::Lookup);
        assert!(matches!(err.source, BrainError::Store(_)));
        assert!(err.to_string().starts_with("resolve failed while looking up"));
        assert!(engine.builds.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_write_failure_is_reported_as_storing() {
        let repo = repo_with("hello");
        let engine = Arc::new(RecordingEngine::default());
        let coord = broken_coordinator(false, engine.clone());

        let err = coord.resolve(repo.path()).await.unwrap_err();
        assert_eq!(err.stage, ResolveStage::Storing);
        assert!(matches!(err.source, BrainError::Store(_)));
        assert_eq!(engine.builds.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn handle_answers_with_configured_settings() {
        let repo = repo_with("hello");
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let coord = coordinator(store, engine);

        let handle = coord.resolve(repo.path()).await.unwrap();
        assert_eq!(handle.settings, BrainSettings::default());
        let answer = handle.answer("leave policy").await.unwrap();
        assert_eq!(answer, "leave policy via claude-3-sonnet-20240229");
    }

    #[tokio::test]
    async fn changed_content_creates_second_record() {
        let repo = repo_with("hello");
        let store = Arc::new(InMemoryIndexStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let coord = coordinator(store.clone(), engine);

        let first = coord.resolve(repo.path()).await.unwrap();
        fs::write(repo.path().join("policies").join("a.txt"), "hello2").unwrap();
        let second = coord.resolve(repo.path()).await.unwrap();

        assert_eq!(second.outcome, CacheOutcome::Miss);
        assert_ne!(first.id, second.id);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }
}
