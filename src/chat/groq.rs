//! Groq chat completions (OpenAI-compatible wire format)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatModel, ChatParams, Conversation};
use crate::{Error, Result};

/// Groq chat completion client
pub struct GroqChat {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GroqChat {
    /// Create a new Groq client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: &SecretString, base_url: &str, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Groq API key required for chat".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Model identifier sent with every request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for GroqChat {
    async fn complete(
        &self,
        conversation: &Conversation,
        params: &ChatParams,
    ) -> Result<Option<String>> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: conversation.messages(),
            temperature: params.temperature,
            max_completion_tokens: params.max_completion_tokens,
            top_p: params.top_p,
            stream: false,
        };

        tracing::debug!(
            model = %self.model,
            messages = conversation.len(),
            temperature = params.temperature,
            "requesting chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Chat(format!("Groq request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Groq API error");
            return Err(Error::Chat(format!("Groq API error: {status} - {body}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Chat(format!("Failed to parse Groq response: {e}")))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        tracing::info!(response = ?content, "chat completion complete");
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
