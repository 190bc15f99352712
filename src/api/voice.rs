//! Voice API endpoints: speech-to-text, text-to-speech and the full voice chat

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use super::error::{ApiError, json_object, string_field};
use super::ApiState;
use crate::chat::{ChatMessage, parse_history};
use crate::config::VoiceChatMode;
use crate::pipeline::{PipelineError, VoiceChatRequest};
use crate::voice::decode_audio;

/// Per-request language override
pub const LANGUAGE_HEADER: &str = "x-language-code";

/// Caller-supplied conversation history (JSON array of `{role, content}`)
pub const HISTORY_HEADER: &str = "x-chat-history";

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/stt", post(speech_to_text))
        .route("/tts", post(text_to_speech))
        .route("/voice-chat", post(voice_chat))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

fn content_type(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

fn language_code(headers: &HeaderMap, default: &str) -> String {
    headers
        .get(LANGUAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn chat_history(headers: &HeaderMap) -> Vec<ChatMessage> {
    let Some(value) = headers.get(HISTORY_HEADER) else {
        return Vec::new();
    };

    // Header values may carry UTF-8 beyond visible ASCII
    match std::str::from_utf8(value.as_bytes()) {
        Ok(raw) => parse_history(raw),
        Err(e) => {
            tracing::warn!(error = %e, "chat history header is not valid UTF-8");
            Vec::new()
        }
    }
}

fn wav_attachment(audio: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        audio,
    )
        .into_response()
}

/// Transcribe a raw audio body
async fn speech_to_text(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let language_code = language_code(&headers, &state.default_language);
    let content_type = content_type(&headers);

    let transcription = state
        .pipeline
        .transcribe_upload(content_type.as_deref(), &body, &language_code)
        .await
        .map_err(|e| match e {
            PipelineError::NoTranscript => {
                ApiError::Internal("No transcription text found in response".to_string())
            }
            other => ApiError::from(other),
        })?;

    Ok(Json(TranscribeResponse { transcription }))
}

/// Synthesize `{ "text": ... }` and return it as a WAV attachment
async fn text_to_speech(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let map = json_object(&body)?;
    let text = string_field(&map, "text")
        .map_err(|e| ApiError::Validation(vec![e]))?
        .ok_or_else(|| ApiError::BadRequest("Missing 'text' in request body".to_string()))?;
    let language_code = language_code(&headers, &state.default_language);

    let synthesis = state
        .pipeline
        .tts()
        .synthesize(&text, &language_code)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "error in /tts endpoint");
            ApiError::from(e)
        })?;

    let audio_base64 = synthesis
        .first()
        .ok_or_else(|| ApiError::from(PipelineError::NoAudio))?;
    let audio = decode_audio(audio_base64)?;

    if let Some(path) = &state.tts_debug_path {
        match tokio::fs::write(path, &audio).await {
            Ok(()) => tracing::info!(path = %path.display(), "saved TTS audio locally"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save TTS audio");
            }
        }
    }

    Ok(wav_attachment(audio, "output.wav"))
}

/// Transcribe, answer and speak the answer back
async fn voice_chat(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let content_type = content_type(&headers);
    tracing::info!(content_type = ?content_type, "received /voice-chat request");

    let language_code = language_code(&headers, &state.default_language);
    let request = VoiceChatRequest {
        content_type: content_type.as_deref(),
        audio: &body,
        language_code: &language_code,
        history: chat_history(&headers),
    };

    let reply = state
        .pipeline
        .voice_chat(request, &state.voice_chat_profile)
        .await?;

    match state.voice_chat_mode {
        VoiceChatMode::Json => Ok(Json(reply).into_response()),
        VoiceChatMode::Attachment => {
            let audio = decode_audio(&reply.audio_base64)?;
            Ok(wav_attachment(audio, "response.wav"))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_language_code_default_and_override() {
        let mut headers = HeaderMap::new();
        assert_eq!(language_code(&headers, "en-IN"), "en-IN");

        headers.insert(LANGUAGE_HEADER, HeaderValue::from_static("ta-IN"));
        assert_eq!(language_code(&headers, "en-IN"), "ta-IN");

        headers.insert(LANGUAGE_HEADER, HeaderValue::from_static("  "));
        assert_eq!(language_code(&headers, "en-IN"), "en-IN");
    }

    #[test]
    fn test_chat_history_accepts_utf8() {
        let mut headers = HeaderMap::new();
        let raw = r#"[{"role":"user","content":"नमस्ते"}]"#;
        headers.insert(HISTORY_HEADER, HeaderValue::from_bytes(raw.as_bytes()).unwrap());

        let history = chat_history(&headers);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "नमस्ते");
    }

    #[test]
    fn test_content_type_keeps_non_utf8_bytes() {
        let mut headers = HeaderMap::new();
        assert!(content_type(&headers).is_none());

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_bytes(b"video/\xffmp4").unwrap(),
        );
        let shown = content_type(&headers).unwrap();
        assert!(shown.starts_with("video/"));
        assert!(shown.ends_with("mp4"));
    }

    #[test]
    fn test_missing_history_is_empty() {
        assert!(chat_history(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_wav_attachment_headers() {
        let response = wav_attachment(b"RIFF".to_vec(), "output.wav");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"output.wav\""
        );
    }
}
