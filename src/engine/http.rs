//! [`Engine`] implementation that talks to a document-QA service over HTTP.
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | build | `POST {endpoint}/brains` `{"name", "file_paths"}` | `{"id"}` |
//! | ask | `POST {endpoint}/brains/{id}/ask` `{"question", "model", "temperature", "max_tokens", "parser"}` | `{"answer"}` |
//!
//! Non-2xx responses become [`BrainError::Engine`] carrying the status and
//! body. Nothing is retried and no client timeout is set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Brain, Engine};
use crate::config::EngineConfig;
use crate::error::{BrainError, BrainResult};
use crate::models::BrainSettings;

#[derive(Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct BuildRequest<'a> {
    name: &'a str,
    file_paths: Vec<String>,
}

#[derive(Deserialize)]
struct BuildResponse {
    id: String,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    parser: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

impl HttpEngine {
    /// Create a client for `config.endpoint`.
    ///
    /// When `config.api_key_env` names a variable, it must be set.
    pub fn new(config: &EngineConfig) -> BrainResult<Self> {
        let api_key = match &config.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                BrainError::Engine(format!("{} environment variable not set", var))
            })?),
            None => None,
        };

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> BrainResult<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(BrainError::Engine(format!(
                "{} returned {}: {}",
                url, status, body_text
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| BrainError::Engine(format!("invalid response from {}: {}", url, e)))
    }
}

#[async_trait]
impl Engine for HttpEngine {
    async fn build_index(&self, name: &str, files: &[PathBuf]) -> BrainResult<Box<dyn Brain>> {
        let url = format!("{}/brains", self.endpoint);
        let body = BuildRequest {
            name,
            file_paths: files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        };

        let built: BuildResponse = self.post_json(&url, &body).await?;
        tracing::debug!(brain_id = %built.id, files = files.len(), "engine built brain");

        Ok(Box::new(HttpBrain {
            engine: self.clone(),
            remote_id: built.id,
            name: name.to_string(),
            file_count: files.len(),
        }))
    }
}

struct HttpBrain {
    engine: HttpEngine,
    remote_id: String,
    name: String,
    file_count: usize,
}

#[async_trait]
impl Brain for HttpBrain {
    async fn answer(&self, question: &str, settings: &BrainSettings) -> BrainResult<String> {
        let url = format!("{}/brains/{}/ask", self.engine.endpoint, self.remote_id);
        let body = AskRequest {
            question,
            model: &settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            parser: &settings.parser,
        };

        let reply: AskResponse = self.engine.post_json(&url, &body).await?;
        Ok(reply.answer)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({} files) at {}/brains/{}",
            self.name, self.file_count, self.engine.endpoint, self.remote_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let engine = HttpEngine::new(&EngineConfig {
            endpoint: "http://localhost:5050/".to_string(),
            api_key_env: None,
        })
        .unwrap();
        assert_eq!(engine.endpoint, "http://localhost:5050");
    }

    #[test]
    fn missing_api_key_variable_is_engine_error() {
        let result = HttpEngine::new(&EngineConfig {
            endpoint: "http://localhost:5050".to_string(),
            api_key_env: Some("REPO_BRAIN_TEST_UNSET_KEY_VAR".to_string()),
        });
        assert!(matches!(result, Err(BrainError::Engine(_))));
    }

    #[test]
    fn ask_request_carries_settings() {
        let settings = BrainSettings::default();
        let body = AskRequest {
            question: "what is the leave policy?",
            model: &settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            parser: &settings.parser,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-3-sonnet-20240229");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["parser"], "simple");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}
