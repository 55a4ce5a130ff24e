//! Model clients for the pattern test battery.
//!
//! `SimulatedClient` answers every prompt with a fixed placeholder so the
//! battery can run offline. `OllamaClient` talks to a local Ollama server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Message in a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat model that answers test prompts.
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    /// Model identifier used in comparisons.
    fn name(&self) -> &str;

    /// Send the conversation and return the assistant's reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

pub const SIMULATED_RESPONSE: &str = "[Simulated response - implement with actual API client]";

/// Offline stand-in that never contacts a model.
#[derive(Debug, Clone)]
pub struct SimulatedClient {
    name: String,
}

impl SimulatedClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for SimulatedClient {
    fn default() -> Self {
        Self::new("simulated")
    }
}

impl ModelClient for SimulatedClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Ok(SIMULATED_RESPONSE.to_string())
    }
}

/// Connection settings for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 120,
        }
    }
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Non-streaming client for `POST {url}/api/chat`.
pub struct OllamaClient {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

impl ModelClient for OllamaClient {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: &self.config.model_name,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("POST {} ({} messages)", url, messages.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.config.ollama_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(chat_response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_client() {
        let client = SimulatedClient::default();
        assert_eq!(client.name(), "simulated");
        let reply = tokio_test::block_on(client.complete(&[ChatMessage::user("Is 97 prime?")]));
        assert_eq!(reply.unwrap(), SIMULATED_RESPONSE);
    }

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.model_name, "llama3.2:latest");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("Be brief."), ChatMessage::user("2+2?")];
        let request = OllamaChatRequest {
            model: "llama3.2:latest",
            messages: &messages,
            stream: false,
            options: OllamaOptions { temperature: 0.5 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:latest");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "2+2?");
        assert_eq!(json["options"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"model":"m","message":{"role":"assistant","content":"Thursday"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "Thursday");
    }

    #[test]
    fn test_unreachable_server() {
        let client = OllamaClient::new(OllamaConfig {
            ollama_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..OllamaConfig::default()
        })
        .unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = rt.block_on(client.complete(&[ChatMessage::user("hi")]));
        assert!(result.is_err());
    }
}
