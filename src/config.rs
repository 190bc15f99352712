//! Configuration management for the Workmates gateway

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::{Error, Result};

/// Default language code applied when a request carries none
pub const DEFAULT_LANGUAGE_CODE: &str = "en-IN";

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_SARVAM_BASE_URL: &str = "https://api.sarvam.ai";
const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_STT_MODEL: &str = "saarika:v2";

/// Gateway configuration, loaded once at startup
#[derive(Debug)]
pub struct Config {
    /// API keys for the vendor services
    pub api_keys: ApiKeys,

    /// Groq-compatible chat completion endpoint root
    pub groq_base_url: String,

    /// Sarvam speech endpoint root
    pub sarvam_base_url: String,

    /// LLM model identifier for chat completions
    pub llm_model: String,

    /// Voice processing configuration
    pub voice: VoiceConfig,
}

/// API keys for external services
///
/// Both are required; [`Config::load`] fails when either is missing.
#[derive(Debug)]
pub struct ApiKeys {
    /// Language-model vendor key (`GROQ_API_KEY`)
    pub groq: SecretString,

    /// Speech vendor key (`SARVAM_API_KEY`)
    pub sarvam: SecretString,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model (e.g. "saarika:v2")
    pub stt_model: String,

    /// Optional TTS model override
    pub tts_model: Option<String>,

    /// Optional TTS speaker override
    pub tts_speaker: Option<String>,

    /// Language code used when the caller supplies none
    pub default_language: String,

    /// Response shape of `/voice-chat`
    pub voice_chat_mode: VoiceChatMode,

    /// Where `/tts` keeps a copy of the last synthesized audio
    pub tts_debug_path: Option<PathBuf>,

    /// Directory for temp audio files (OS temp dir when unset)
    pub temp_dir: Option<PathBuf>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: DEFAULT_STT_MODEL.to_string(),
            tts_model: None,
            tts_speaker: None,
            default_language: DEFAULT_LANGUAGE_CODE.to_string(),
            voice_chat_mode: VoiceChatMode::default(),
            tts_debug_path: None,
            temp_dir: None,
        }
    }
}

/// Deployment variant of the `/voice-chat` endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceChatMode {
    /// JSON body with transcript, reply text and base64 audio
    #[default]
    Json,
    /// Binary `audio/wav` attachment of the synthesized reply
    Attachment,
}

impl FromStr for VoiceChatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "attachment" | "audio" | "wav" => Ok(Self::Attachment),
            other => Err(Error::Config(format!(
                "unknown voice chat mode: {other} (expected \"json\" or \"attachment\")"
            ))),
        }
    }
}

impl fmt::Display for VoiceChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Attachment => f.write_str("attachment"),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing or a value is malformed
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing or a value is malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let groq = var("GROQ_API_KEY").ok_or_else(|| {
            tracing::error!("GROQ_API_KEY environment variable not set");
            Error::Config("GROQ_API_KEY environment variable not set".to_string())
        })?;
        let sarvam = var("SARVAM_API_KEY").ok_or_else(|| {
            tracing::error!("SARVAM_API_KEY environment variable not set");
            Error::Config("SARVAM_API_KEY environment variable not set".to_string())
        })?;

        let voice_chat_mode = var("WORKMATES_VOICE_CHAT_MODE")
            .map(|v| v.parse::<VoiceChatMode>())
            .transpose()?
            .unwrap_or_default();

        let voice = VoiceConfig {
            stt_model: var("WORKMATES_STT_MODEL").unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            tts_model: var("WORKMATES_TTS_MODEL"),
            tts_speaker: var("WORKMATES_TTS_SPEAKER"),
            default_language: var("WORKMATES_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
            voice_chat_mode,
            tts_debug_path: var("WORKMATES_TTS_DEBUG_PATH").map(PathBuf::from),
            temp_dir: var("WORKMATES_TEMP_DIR").map(PathBuf::from),
        };

        Ok(Self {
            api_keys: ApiKeys {
                groq: SecretString::from(groq),
                sarvam: SecretString::from(sarvam),
            },
            groq_base_url: var("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            sarvam_base_url: var("SARVAM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SARVAM_BASE_URL.to_string()),
            llm_model: var("WORKMATES_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            voice,
        })
    }
}
