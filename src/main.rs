//! # Repo Brain CLI (`repo-brain`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `repo-brain chat` | Resolve the brain and start the interactive chat (default) |
//! | `repo-brain resolve` | Resolve once and report cache hit/miss |
//! | `repo-brain status` | List stored brains |
//! | `repo-brain init` | Create the store file and schema |
//!
//! ## Examples
//!
//! ```bash
//! # Chat about ./policies using the default store at ~/.quivr/brain_storage.db
//! repo-brain
//!
//! # Warm the cache for another checkout
//! repo-brain --root ../handbook resolve
//!
//! RUST_LOG=repo_brain=debug repo-brain --config ./config/brain.toml chat
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use repo_brain::config::{self, Config};
use repo_brain::coordinator::Coordinator;
use repo_brain::engine::HttpEngine;
use repo_brain::models::BrainSettings;
use repo_brain::progress::ProgressMode;
use repo_brain::session::{render_status, ChatSession};
use repo_brain::store::{IndexStore, SqliteIndexStore};

/// Repository assistant that answers questions about the documents in
/// `<root>/policies`, caching built brains by document content.
#[derive(Parser)]
#[command(name = "repo-brain", version)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository root holding the corpus directory. Defaults to the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat.
    Chat,

    /// Resolve the brain once and report whether the cache was hit.
    Resolve,

    /// List every brain recorded in the store.
    Status,

    /// Create the store file and schema.
    ///
    /// Idempotent; running it repeatedly is safe.
    Init,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_brain=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_coordinator(cfg: &Config, store: Arc<SqliteIndexStore>) -> Result<Coordinator> {
    let engine = HttpEngine::new(&cfg.engine).context("Failed to create engine client")?;
    Ok(Coordinator::new(
        store,
        Arc::new(engine),
        cfg.corpus.clone(),
        cfg.brain.namespace.clone(),
        BrainSettings::default(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = config::load_config(cli.config.as_deref())?;
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    // The store is the cache substrate; nothing runs without it.
    let store = Arc::new(
        SqliteIndexStore::open(&cfg.store.path)
            .await
            .with_context(|| format!("Failed to open index store: {}", cfg.store.path.display()))?,
    );

    let result = run(cli.command.unwrap_or(Commands::Chat), &cfg, root, store.clone()).await;
    store.close().await;
    result
}

async fn run(
    command: Commands,
    cfg: &Config,
    root: PathBuf,
    store: Arc<SqliteIndexStore>,
) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Index store ready at {}", cfg.store.path.display());
        }
        Commands::Status => {
            let records = store.list_all().await?;
            print!("{}", render_status(&records));
        }
        Commands::Resolve => {
            let coordinator = build_coordinator(cfg, store)?;
            let handle = coordinator.resolve(&root).await?;
            println!("resolve {}", root.display());
            println!("  id: {}", handle.id);
            println!("  cache: {}", handle.outcome);
            println!("  files: {}", handle.files.len());
            println!("ok");
        }
        Commands::Chat => {
            let coordinator = build_coordinator(cfg, store)?;
            let mut session = ChatSession::new(
                coordinator,
                root,
                ProgressMode::default_for_tty().reporter(),
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            session.run(stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
