//! Chat completion: conversation types and the language-model adapter

mod groq;

pub use groq::GroqChat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// System prompt prepended to every voice conversation
pub const VOICE_SYSTEM_PROMPT: &str = "You are Workmates Bot, a helpful, friendly, and multilingual AI voice assistant for India. \
You can understand and respond in English, Hindi, Bengali, Gujarati, Kannada, Malayalam, Marathi, Odia, Punjabi, Tamil, and Telugu. \
Always reply in the language the user spoke. Keep your answers concise, clear, and conversational. \
Dont make any assumptions and dont make up information.";

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered prompt context sent to the language model
///
/// Order is: optional system prompt, caller history, current utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Build a conversation ending in the current user utterance
    #[must_use]
    pub fn build(system_prompt: Option<&str>, history: Vec<ChatMessage>, utterance: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(prompt) = system_prompt {
            messages.push(ChatMessage::system(prompt));
        }
        messages.extend(history);
        messages.push(ChatMessage::user(utterance));
        Self { messages }
    }

    /// Single user message, no system prompt or history
    #[must_use]
    pub fn single(utterance: &str) -> Self {
        Self::build(None, Vec::new(), utterance)
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Generation parameters for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub top_p: f32,
}

impl ChatParams {
    /// Profile used by the standalone `/chat` endpoint
    #[must_use]
    pub const fn standalone() -> Self {
        Self {
            temperature: 0.5,
            max_completion_tokens: 1024,
            top_p: 1.0,
        }
    }

    /// Profile used by the JSON voice assistant
    #[must_use]
    pub const fn voice_assistant() -> Self {
        Self {
            temperature: 0.3,
            max_completion_tokens: 512,
            top_p: 1.0,
        }
    }
}

/// Parse a caller-supplied history (JSON array of `{role, content}`)
///
/// Entries that fail to parse are logged and skipped. A payload that is not a
/// JSON array yields an empty history.
#[must_use]
pub fn parse_history(raw: &str) -> Vec<ChatMessage> {
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "invalid history format");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<ChatMessage>(entry) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed history entry");
                None
            }
        })
        .collect()
}

/// Language-model chat completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete `conversation`, returning the generated text if any
    ///
    /// # Errors
    ///
    /// Returns error if the vendor call fails
    async fn complete(
        &self,
        conversation: &Conversation,
        params: &ChatParams,
    ) -> Result<Option<String>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
