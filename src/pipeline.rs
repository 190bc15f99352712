//! Voice-chat orchestration
//!
//! One request flows strictly in order:
//!
//! ```text
//! Validating → Storing → Transcribing → Generating → Synthesizing → Responding
//! ```
//!
//! The temp audio handle is held for the whole run and dropped on every exit
//! path, so cleanup runs exactly once whether the request succeeds or stops
//! early. No stage retries.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::chat::{ChatMessage, ChatModel, ChatParams, Conversation, GroqChat};
use crate::config::Config;
use crate::voice::{SarvamStt, SarvamTts, Synthesizer, TempAudio, TempAudioStore, Transcriber};
use crate::Error;

/// Pipeline stage, used in logs and stage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Storing,
    Transcribing,
    Generating,
    Synthesizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Storing => "storing",
            Self::Transcribing => "transcribing",
            Self::Generating => "generating",
            Self::Synthesizing => "synthesizing",
        };
        f.write_str(name)
    }
}

/// Terminal failures of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upload is not declared as audio
    #[error("Invalid Content-Type: {0}. Must be an audio MIME type like audio/wav or audio/mpeg.")]
    InvalidContentType(String),

    /// STT answered without a transcript
    #[error("No transcription text found from STT")]
    NoTranscript,

    /// LLM answered without text
    #[error("No text returned from LLM response")]
    NoCompletion,

    /// TTS answered without audio
    #[error("No audio returned from TTS")]
    NoAudio,

    /// A stage failed outright
    #[error("{source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Error,
    },
}

impl PipelineError {
    fn at(stage: Stage, source: Error) -> Self {
        Self::Stage { stage, source }
    }
}

/// Chat settings for one voice-chat deployment variant
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfile {
    /// Prepended as the first message when present
    pub system_prompt: Option<String>,
    pub params: ChatParams,
}

impl GenerationProfile {
    /// Multilingual assistant: system prompt, low temperature, short replies
    #[must_use]
    pub fn assistant() -> Self {
        Self {
            system_prompt: Some(crate::chat::VOICE_SYSTEM_PROMPT.to_string()),
            params: ChatParams::voice_assistant(),
        }
    }

    /// Bare relay of the transcript, matching the standalone chat endpoint
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            system_prompt: None,
            params: ChatParams::standalone(),
        }
    }
}

/// Input of one voice-chat run
#[derive(Debug)]
pub struct VoiceChatRequest<'a> {
    pub content_type: Option<&'a str>,
    pub audio: &'a [u8],
    pub language_code: &'a str,
    pub history: Vec<ChatMessage>,
}

/// Output of a fully successful voice-chat run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VoiceChatReply {
    pub transcription: String,
    pub response: String,
    pub audio_base64: String,
}

/// Reject uploads whose content type is missing or not `audio/*`
///
/// # Errors
///
/// Returns [`PipelineError::InvalidContentType`] naming the offending type
pub fn ensure_audio(content_type: Option<&str>) -> Result<(), PipelineError> {
    match content_type {
        Some(ct) if ct.starts_with("audio/") => Ok(()),
        other => {
            let shown = other.unwrap_or("<missing>").to_string();
            tracing::warn!(content_type = %shown, "invalid Content-Type");
            Err(PipelineError::InvalidContentType(shown))
        }
    }
}

/// Sequences the three vendor adapters for a single request
#[derive(Clone)]
pub struct VoicePipeline {
    stt: Arc<dyn Transcriber>,
    chat: Arc<dyn ChatModel>,
    tts: Arc<dyn Synthesizer>,
    store: TempAudioStore,
}

impl VoicePipeline {
    #[must_use]
    pub fn new(
        stt: Arc<dyn Transcriber>,
        chat: Arc<dyn ChatModel>,
        tts: Arc<dyn Synthesizer>,
        store: TempAudioStore,
    ) -> Self {
        Self { stt, chat, tts, store }
    }

    /// Build the vendor clients described by `config`
    ///
    /// # Errors
    ///
    /// Returns error if a vendor client cannot be constructed
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let stt = SarvamStt::new(
            &config.api_keys.sarvam,
            &config.sarvam_base_url,
            config.voice.stt_model.clone(),
        )?;
        let tts = SarvamTts::new(&config.api_keys.sarvam, &config.sarvam_base_url)?
            .with_model(config.voice.tts_model.clone())
            .with_speaker(config.voice.tts_speaker.clone());
        let chat = GroqChat::new(
            &config.api_keys.groq,
            &config.groq_base_url,
            config.llm_model.clone(),
        )?;
        let store = config
            .voice
            .temp_dir
            .clone()
            .map_or_else(TempAudioStore::default, TempAudioStore::new);

        tracing::info!(
            llm_model = chat.model(),
            temp_dir = %store.dir().display(),
            "voice pipeline ready"
        );

        Ok(Self::new(Arc::new(stt), Arc::new(chat), Arc::new(tts), store))
    }

    /// Chat adapter, shared with the standalone endpoint
    #[must_use]
    pub fn chat(&self) -> &dyn ChatModel {
        self.chat.as_ref()
    }

    /// Synthesis adapter, shared with the standalone endpoint
    #[must_use]
    pub fn tts(&self) -> &dyn Synthesizer {
        self.tts.as_ref()
    }

    /// Validate, store and transcribe an upload
    ///
    /// # Errors
    ///
    /// Returns error on a non-audio content type, a storage or vendor failure,
    /// or an empty transcript
    pub async fn transcribe_upload(
        &self,
        content_type: Option<&str>,
        audio: &[u8],
        language_code: &str,
    ) -> Result<String, PipelineError> {
        ensure_audio(content_type)?;
        let stored = self.store_audio(audio)?;
        self.transcribe(&stored, language_code).await
    }

    /// Run the whole voice-chat pipeline
    ///
    /// # Errors
    ///
    /// Returns the first terminal failure; nothing partial is reported
    pub async fn voice_chat(
        &self,
        request: VoiceChatRequest<'_>,
        profile: &GenerationProfile,
    ) -> Result<VoiceChatReply, PipelineError> {
        ensure_audio(request.content_type)?;
        tracing::info!(language_code = request.language_code, "using language code");

        let stored = self.store_audio(request.audio)?;
        let transcription = self.transcribe(&stored, request.language_code).await?;

        let conversation = Conversation::build(
            profile.system_prompt.as_deref(),
            request.history,
            &transcription,
        );
        let response = self.generate(&conversation, &profile.params).await?;
        let audio_base64 = self.synthesize(&response, request.language_code).await?;
        stored.release();

        tracing::info!("returning synthesized audio response");
        Ok(VoiceChatReply {
            transcription,
            response,
            audio_base64,
        })
    }

    fn store_audio(&self, audio: &[u8]) -> Result<TempAudio, PipelineError> {
        self.store.store(audio).map_err(|e| {
            tracing::error!(error = %e, "failed to store incoming audio");
            PipelineError::at(Stage::Storing, e)
        })
    }

    async fn transcribe(
        &self,
        audio: &TempAudio,
        language_code: &str,
    ) -> Result<String, PipelineError> {
        let result = self
            .stt
            .transcribe(audio, language_code)
            .await
            .map_err(|e| {
                tracing::error!(provider = self.stt.name(), error = %e, "transcription failed");
                PipelineError::at(Stage::Transcribing, e)
            })?;

        match result.text() {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::error!("no transcription text found from STT");
                Err(PipelineError::NoTranscript)
            }
        }
    }

    async fn generate(
        &self,
        conversation: &Conversation,
        params: &ChatParams,
    ) -> Result<String, PipelineError> {
        let text = self
            .chat
            .complete(conversation, params)
            .await
            .map_err(|e| {
                tracing::error!(provider = self.chat.name(), error = %e, "chat completion failed");
                PipelineError::at(Stage::Generating, e)
            })?;

        match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => Ok(text),
            None => {
                tracing::error!("no text returned from LLM response");
                Err(PipelineError::NoCompletion)
            }
        }
    }

    async fn synthesize(&self, text: &str, language_code: &str) -> Result<String, PipelineError> {
        let synthesis = self
            .tts
            .synthesize(text, language_code)
            .await
            .map_err(|e| {
                tracing::error!(provider = self.tts.name(), error = %e, "synthesis failed");
                PipelineError::at(Stage::Synthesizing, e)
            })?;

        synthesis.first().map(ToString::to_string).ok_or_else(|| {
            tracing::error!("no audio returned from TTS");
            PipelineError::NoAudio
        })
    }
}
