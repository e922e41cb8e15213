use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::chat::{ChatMessage, ChatRole};
use crate::constants;
use crate::error::{QuizError, Result};

// Structures matching Ollama's /api/chat endpoint
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool, // We want the full reply, not a stream
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: ChatRole,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: OllamaReply,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Deserialize, Debug)]
struct OllamaReply {
    content: String,
}

/// Client for the chat model behind the chat view.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Client with the `OLLAMA_TIMEOUT_SECS` request timeout.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(
            base_url,
            model,
            Duration::from_secs(*constants::OLLAMA_TIMEOUT_SECS),
        )
    }

    /// A request that takes longer than `timeout` fails with `QuizError::Chat`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Uses `OLLAMA_URL` and `GARDEN_CHAT_MODEL`.
    pub fn from_env() -> Result<Self> {
        Self::new(constants::OLLAMA_URL.as_str(), constants::GARDEN_CHAT_MODEL.as_str())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the whole conversation and returns the assistant's next turn, trimmed.
    #[instrument(skip(self, messages), fields(model = %self.model, turns = messages.len()))]
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = OllamaChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %error_body, "Ollama API request failed");
            return Err(QuizError::Chat(format!(
                "Ollama API request failed with status {}: {}",
                status, error_body
            )));
        }

        let reply = response.json::<OllamaChatResponse>().await?;
        debug!(reply = ?reply.message.content, "Received Ollama reply");

        Ok(reply.message.content.trim().to_string())
    }
}
