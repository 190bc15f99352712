//! Speech-to-text (STT) processing

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::TempAudio;
use crate::{Error, Result};

/// Outcome of a transcription call
///
/// A vendor can answer successfully and still produce nothing; that case is
/// `transcript: None` and is distinct from an `Err` returned by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub transcript: Option<String>,
}

impl Transcription {
    /// Wrap a transcript, treating blank text as absent
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            transcript: (!text.trim().is_empty()).then_some(text),
        }
    }

    /// Transcript text, if the vendor produced any
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.transcript.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Transcribes stored audio to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio held in `audio`
    ///
    /// # Errors
    ///
    /// Returns error if the vendor call fails
    async fn transcribe(&self, audio: &TempAudio, language_code: &str) -> Result<Transcription>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Sarvam speech-to-text client
pub struct SarvamStt {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl SarvamStt {
    /// Create a new Sarvam STT client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: &SecretString, base_url: &str, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Sarvam API key required for STT".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl Transcriber for SarvamStt {
    async fn transcribe(&self, audio: &TempAudio, language_code: &str) -> Result<Transcription> {
        let bytes = audio.read().await?;
        tracing::debug!(audio_bytes = bytes.len(), language_code, "starting Sarvam transcription");

        let part = Part::bytes(bytes)
            .file_name(audio.file_name())
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language_code", language_code.to_string());

        let response = self
            .client
            .post(format!("{}/speech-to-text", self.base_url))
            .header("api-subscription-key", self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Sarvam STT request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Sarvam STT API error");
            return Err(Error::Stt(format!("Sarvam STT API error {status}: {body}")));
        }

        let result: Transcription = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse STT response");
            e
        })?;

        tracing::info!(transcript = ?result.text(), "transcription complete");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "sarvam-stt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_transcript_is_absent() {
        assert_eq!(Transcription::new("  ").text(), None);
        assert_eq!(Transcription::new("namaste").text(), Some("namaste"));
    }

    #[test]
    fn test_parse_vendor_response() {
        let raw = r#"{"request_id":"r1","transcript":"hello","language_code":"en-IN"}"#;
        let parsed: Transcription = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("hello"));

        let missing: Transcription = serde_json::from_str(r#"{"request_id":"r1"}"#).unwrap();
        assert_eq!(missing.text(), None);

        let empty: Transcription = serde_json::from_str(r#"{"transcript":""}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_empty_key_rejected() {
        let key = SecretString::from(String::new());
        assert!(SarvamStt::new(&key, "https://api.sarvam.ai", "saarika:v2".to_string()).is_err());
    }
}
