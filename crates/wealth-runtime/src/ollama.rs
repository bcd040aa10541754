//! Ollama Completion Provider
//!
//! Implementation of `CompletionProvider` for local Ollama inference.

use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
};
use tracing::{debug, warn};
use wealth_engine::CompletionProvider;

use crate::error::RuntimeError;

const SYSTEM_PROMPT: &str = "You answer with machine-readable JSON only. Never add commentary.";

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model used for completions
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let model = std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model);
        let timeout_secs = std::env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            host,
            port,
            model,
            timeout_secs,
        }
    }
}

/// Single-shot chat completions from Ollama
pub struct OllamaCompletion {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaCompletion {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(&config.host, config.port),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn build_messages(prompt: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::System, SYSTEM_PROMPT.to_string()),
            ChatMessage::new(MessageRole::User, prompt.to_string()),
        ]
    }

    async fn chat(&self, prompt: &str) -> crate::Result<String> {
        let request = ChatMessageRequest::new(self.config.model.clone(), Self::build_messages(prompt));

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.client.send_chat_messages(request),
        )
        .await
        .map_err(|_| RuntimeError::Timeout(self.config.timeout_secs))?
        .map_err(|e| RuntimeError::Provider(e.to_string()))?;

        let content = response.message.content;
        if content.trim().is_empty() {
            return Err(RuntimeError::EmptyCompletion);
        }
        Ok(content)
    }

    /// Check that the Ollama daemon answers
    pub async fn health_check(&self) -> bool {
        match self.client.list_local_models().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaCompletion {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> wealth_engine::Result<String> {
        debug!(model = %self.config.model, "Requesting Ollama completion");
        Ok(self.chat(prompt).await?)
    }

    async fn health_check(&self) -> bool {
        Self::health_check(self).await
    }
}
