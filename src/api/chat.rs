//! Standalone chat endpoint

use std::sync::Arc;

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, FieldError, json_object, string_field};
use super::ApiState;
use crate::chat::Conversation;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub request: String,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatRequest {
    /// Validate a raw body into a request
    ///
    /// # Errors
    ///
    /// Returns 400 for a non-object body and 422 when `request` is missing or not a string
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let map = json_object(body)?;
        match string_field(&map, "request") {
            Ok(Some(request)) => Ok(Self { request }),
            Ok(None) => Err(ApiError::Validation(vec![FieldError::missing("request")])),
            Err(e) => Err(ApiError::Validation(vec![e])),
        }
    }
}

/// Send one user message to the language model, no system prompt or history
async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = ChatRequest::from_body(&body)?;
    let conversation = Conversation::single(&request.request);

    let content = state
        .pipeline
        .chat()
        .complete(&conversation, &state.chat_params)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "error in /chat endpoint");
            ApiError::from(e)
        })?;

    Ok(Json(ChatResponse {
        response: content.unwrap_or_default(),
    }))
}
