//! Shared test utilities: stub vendor adapters and router construction

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use workmates_gateway::{
    ApiState, ChatModel, ChatParams, Conversation, Error, Result, Synthesis, Synthesizer,
    TempAudio, TempAudioStore, Transcriber, Transcription, VoiceChatMode, VoicePipeline,
};

/// Scripted outcome of a stub call
#[derive(Clone)]
pub enum Reply {
    Text(&'static str),
    Empty,
    Fail(&'static str),
}

/// Speech-to-text stub recording every call
pub struct StubStt {
    reply: Reply,
    calls: AtomicUsize,
    languages: Mutex<Vec<String>>,
    /// Temp file path seen by each call and whether it existed at that moment
    paths: Mutex<Vec<(PathBuf, bool)>>,
}

impl StubStt {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            languages: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<(PathBuf, bool)> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for StubStt {
    async fn transcribe(&self, audio: &TempAudio, language_code: &str) -> Result<Transcription> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language_code.to_string());
        self.paths
            .lock()
            .unwrap()
            .push((audio.path().to_path_buf(), audio.path().exists()));

        match self.reply {
            Reply::Text(text) => Ok(Transcription::new(text)),
            Reply::Empty => Ok(Transcription::default()),
            Reply::Fail(msg) => Err(Error::Stt(msg.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub-stt"
    }
}

/// Chat stub recording every conversation it receives
pub struct StubChat {
    reply: Reply,
    calls: AtomicUsize,
    conversations: Mutex<Vec<Conversation>>,
    params: Mutex<Vec<ChatParams>>,
}

impl StubChat {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            conversations: Mutex::new(Vec::new()),
            params: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.conversations.lock().unwrap().clone()
    }

    pub fn params(&self) -> Vec<ChatParams> {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(
        &self,
        conversation: &Conversation,
        params: &ChatParams,
    ) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.conversations.lock().unwrap().push(conversation.clone());
        self.params.lock().unwrap().push(params.clone());

        match self.reply {
            Reply::Text(text) => Ok(Some(text.to_string())),
            Reply::Empty => Ok(None),
            Reply::Fail(msg) => Err(Error::Chat(msg.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub-chat"
    }
}

/// Text-to-speech stub recording `(text, language)` pairs
pub struct StubTts {
    reply: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl StubTts {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for StubTts {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<Synthesis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), language_code.to_string()));

        match self.reply {
            Reply::Text(audio) => Ok(Synthesis {
                audios: vec![audio.to_string()],
            }),
            Reply::Empty => Ok(Synthesis::default()),
            Reply::Fail(msg) => Err(Error::Tts(msg.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub-tts"
    }
}

/// The three stubs wired into one pipeline
pub struct Stubs {
    pub stt: Arc<StubStt>,
    pub chat: Arc<StubChat>,
    pub tts: Arc<StubTts>,
}

impl Stubs {
    pub fn new(stt: Reply, chat: Reply, tts: Reply) -> Self {
        Self {
            stt: StubStt::new(stt),
            chat: StubChat::new(chat),
            tts: StubTts::new(tts),
        }
    }

    /// Stubs returning transcript "namaste", reply "hello back", audio "QUJD"
    pub fn happy() -> Self {
        Self::new(Reply::Text("namaste"), Reply::Text("hello back"), Reply::Text("QUJD"))
    }

    pub fn pipeline(&self, temp_dir: &Path) -> VoicePipeline {
        VoicePipeline::new(
            self.stt.clone(),
            self.chat.clone(),
            self.tts.clone(),
            TempAudioStore::new(temp_dir),
        )
    }

    pub fn state(&self, temp_dir: &Path, mode: VoiceChatMode) -> ApiState {
        ApiState::new(self.pipeline(temp_dir)).with_voice_chat_mode(mode)
    }

    pub fn router(&self, temp_dir: &Path) -> Router {
        self.router_with_mode(temp_dir, VoiceChatMode::Json)
    }

    pub fn router_with_mode(&self, temp_dir: &Path, mode: VoiceChatMode) -> Router {
        workmates_gateway::api::router(Arc::new(self.state(temp_dir, mode)))
    }
}

/// Number of entries left in a directory
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}

/// Collect a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Collect a response body as raw bytes
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
