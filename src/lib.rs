//! Workmates Gateway - voice assistant backend
//!
//! Chains three vendor services behind a small HTTP API:
//! - Speech-to-text (Sarvam)
//! - Chat completion (Groq)
//! - Text-to-speech (Sarvam)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     HTTP API                         │
//! │   /chat  │  /stt  │  /tts  │  /voice-chat  │ /health │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Voice Pipeline                       │
//! │   validate → store → transcribe → generate → speak   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Vendor adapters                      │
//! │        SarvamStt  │  GroqChat  │  SarvamTts           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod voice;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use chat::{ChatMessage, ChatModel, ChatParams, Conversation, GroqChat, Role};
pub use config::{Config, VoiceChatMode};
pub use error::{Error, Result};
pub use pipeline::{GenerationProfile, PipelineError, VoiceChatReply, VoicePipeline};
pub use voice::{
    SarvamStt, SarvamTts, Synthesis, Synthesizer, TempAudio, TempAudioStore, Transcriber,
    Transcription,
};
