//! HTTP API server for the Workmates gateway

pub mod chat;
pub mod error;
pub mod health;
pub mod voice;

pub use error::{ApiError, FieldError};

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::ChatParams;
use crate::config::{DEFAULT_LANGUAGE_CODE, VoiceChatMode};
use crate::pipeline::{GenerationProfile, VoicePipeline};
use crate::Result;

/// Largest accepted request body (audio uploads)
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for API handlers
///
/// Built once at startup; vendor clients inside the pipeline are reused
/// across requests.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: VoicePipeline,
    pub default_language: String,
    pub voice_chat_mode: VoiceChatMode,
    pub voice_chat_profile: GenerationProfile,
    pub chat_params: ChatParams,
    pub tts_debug_path: Option<PathBuf>,
}

impl ApiState {
    /// State with defaults for everything but the pipeline
    #[must_use]
    pub fn new(pipeline: VoicePipeline) -> Self {
        Self {
            pipeline,
            default_language: DEFAULT_LANGUAGE_CODE.to_string(),
            voice_chat_mode: VoiceChatMode::default(),
            voice_chat_profile: GenerationProfile::assistant(),
            chat_params: ChatParams::standalone(),
            tts_debug_path: None,
        }
    }

    /// Select the `/voice-chat` variant along with its generation profile
    #[must_use]
    pub fn with_voice_chat_mode(mut self, mode: VoiceChatMode) -> Self {
        self.voice_chat_mode = mode;
        self.voice_chat_profile = match mode {
            VoiceChatMode::Json => GenerationProfile::assistant(),
            VoiceChatMode::Attachment => GenerationProfile::plain(),
        };
        self
    }
}

/// Build the router with all routes
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::router(state.clone()))
        .merge(voice::router(state))
        .merge(health::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    pipeline: VoicePipeline,
    host: String,
    port: u16,
    default_language: String,
    voice_chat_mode: VoiceChatMode,
    tts_debug_path: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(pipeline: VoicePipeline, port: u16) -> Self {
        Self {
            pipeline,
            host: "0.0.0.0".to_string(),
            port,
            default_language: DEFAULT_LANGUAGE_CODE.to_string(),
            voice_chat_mode: VoiceChatMode::default(),
            tts_debug_path: None,
        }
    }

    /// Set bind address
    #[must_use]
    pub fn host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Set the language code used when requests carry none
    #[must_use]
    pub fn default_language(mut self, code: String) -> Self {
        self.default_language = code;
        self
    }

    /// Set the `/voice-chat` response variant
    #[must_use]
    pub fn voice_chat_mode(mut self, mode: VoiceChatMode) -> Self {
        self.voice_chat_mode = mode;
        self
    }

    /// Keep a copy of `/tts` output at `path`
    #[must_use]
    pub fn tts_debug_path(mut self, path: Option<PathBuf>) -> Self {
        self.tts_debug_path = path;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let mut state = ApiState::new(self.pipeline).with_voice_chat_mode(self.voice_chat_mode);
        state.default_language = self.default_language;
        state.tts_debug_path = self.tts_debug_path;

        ApiServer {
            state: Arc::new(state),
            host: self.host,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            addr = %addr,
            voice_chat_mode = %self.state.voice_chat_mode,
            default_language = %self.state.default_language,
            "API server listening"
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
