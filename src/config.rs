use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub brain: BrainConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quivr")
        .join("brain_storage.db")
}

/// Where documents are looked up relative to the repository root.
#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_subdir")]
    pub subdir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            subdir: default_subdir(),
            extensions: default_extensions(),
        }
    }
}

fn default_subdir() -> String {
    "policies".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrainConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    "repo_brain".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding a bearer token, if any.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5050".to_string()
}

/// Load the config file at `path`, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.store.path = expand_home(&config.store.path);
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.brain.namespace.trim().is_empty() {
        bail!("brain.namespace must not be empty");
    }

    if config.corpus.subdir.trim().is_empty() {
        bail!("corpus.subdir must not be empty");
    }

    if config.corpus.extensions.is_empty() {
        bail!("corpus.extensions must list at least one extension");
    }

    let endpoint = &config.engine.endpoint;
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        bail!(
            "engine.endpoint must be an http(s) URL, got '{}'",
            endpoint
        );
    }

    Ok(())
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
