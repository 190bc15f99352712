//! Text-to-speech (TTS) processing

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Outcome of a synthesis call: zero or more base64-encoded audio payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Synthesis {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audios: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Synthesis {
    /// First payload; the only one used downstream
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.audios.first().map(String::as_str).filter(|a| !a.is_empty())
    }
}

/// Decode a base64 audio payload
///
/// # Errors
///
/// Returns error if the payload is not valid base64
pub fn decode_audio(audio_base64: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(audio_base64.trim())
        .map_err(|e| Error::Audio(format!("invalid base64 audio: {e}")))
}

/// Synthesizes speech from text
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` in `language_code`
    ///
    /// # Errors
    ///
    /// Returns error if the vendor call fails
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<Synthesis>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Sarvam text-to-speech client
pub struct SarvamTts {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: Option<String>,
    speaker: Option<String>,
}

impl SarvamTts {
    /// Create a new Sarvam TTS client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: &SecretString, base_url: &str) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Sarvam API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: None,
            speaker: None,
        })
    }

    /// Override the vendor's default TTS model
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Override the vendor's default speaker voice
    #[must_use]
    pub fn with_speaker(mut self, speaker: Option<String>) -> Self {
        self.speaker = speaker;
        self
    }
}

#[async_trait]
impl Synthesizer for SarvamTts {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<Synthesis> {
        #[derive(Serialize)]
        struct TtsRequest<'a> {
            text: &'a str,
            target_language_code: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            speaker: Option<&'a str>,
        }

        let request = TtsRequest {
            text,
            target_language_code: language_code,
            model: self.model.as_deref(),
            speaker: self.speaker.as_deref(),
        };

        tracing::debug!(chars = text.chars().count(), language_code, "starting Sarvam synthesis");

        let response = self
            .client
            .post(format!("{}/text-to-speech", self.base_url))
            .header("api-subscription-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Sarvam TTS API error");
            return Err(Error::Tts(format!("Sarvam TTS error {status}: {body}")));
        }

        let result: Synthesis = response.json().await?;
        tracing::debug!(payloads = result.audios.len(), "synthesis complete");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "sarvam-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_payload_wins() {
        let synthesis = Synthesis {
            audios: vec!["QUJD".to_string(), "REVG".to_string()],
        };
        assert_eq!(synthesis.first(), Some("QUJD"));
    }

    #[test]
    fn test_empty_synthesis_has_no_audio() {
        assert_eq!(Synthesis::default().first(), None);

        let parsed: Synthesis = serde_json::from_str(r#"{"request_id":"r1"}"#).unwrap();
        assert_eq!(parsed.first(), None);

        let blank: Synthesis = serde_json::from_str(r#"{"audios":[""]}"#).unwrap();
        assert_eq!(blank.first(), None);
    }

    #[test]
    fn test_null_audios_is_empty() {
        let parsed: Synthesis = serde_json::from_str(r#"{"audios":null}"#).unwrap();
        assert!(parsed.audios.is_empty());
        assert_eq!(parsed.first(), None);
    }

    #[test]
    fn test_decode_audio() {
        assert_eq!(decode_audio("QUJD").unwrap(), b"ABC");
        assert!(decode_audio("not base64!").is_err());
    }
}
