use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use workmates_gateway::voice::decode_audio;
use workmates_gateway::{
    ApiServerBuilder, Config, SarvamStt, SarvamTts, Synthesizer, TempAudioStore, Transcriber,
    VoiceChatMode, VoicePipeline,
};

/// Workmates - voice assistant backend (STT → LLM → TTS)
#[derive(Parser)]
#[command(name = "workmates", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "WORKMATES_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "WORKMATES_PORT", default_value = "8000")]
    port: u16,

    /// Response shape of /voice-chat ("json" or "attachment"), overrides the environment
    #[arg(long)]
    voice_chat_mode: Option<VoiceChatMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio file and print the transcript
    Transcribe {
        /// Audio file to transcribe
        file: PathBuf,
        /// Language code (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Synthesize text and write the audio to a file
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello, how are you?")]
        text: String,
        /// Language code (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
        /// Output file
        #[arg(short, long, default_value = "output.wav")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,workmates_gateway=info",
        1 => "info,workmates_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Fails fast when an API key is missing
    let mut config = Config::load()?;
    if let Some(mode) = cli.voice_chat_mode {
        config.voice.voice_chat_mode = mode;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Transcribe { file, language } => transcribe(&config, &file, language).await,
            Command::Speak { text, language, out } => speak(&config, &text, language, &out).await,
        };
    }

    tracing::info!(host = %cli.host, port = cli.port, "starting workmates gateway");
    tracing::debug!(?config, "loaded configuration");

    let pipeline = VoicePipeline::from_config(&config)?;
    let server = ApiServerBuilder::new(pipeline, cli.port)
        .host(cli.host)
        .default_language(config.voice.default_language.clone())
        .voice_chat_mode(config.voice.voice_chat_mode)
        .tts_debug_path(config.voice.tts_debug_path.clone())
        .build();

    server.run().await?;
    Ok(())
}

/// Transcribe a local file through the STT vendor
async fn transcribe(
    config: &Config,
    file: &std::path::Path,
    language: Option<String>,
) -> anyhow::Result<()> {
    let language = language.unwrap_or_else(|| config.voice.default_language.clone());
    let stt = SarvamStt::new(
        &config.api_keys.sarvam,
        &config.sarvam_base_url,
        config.voice.stt_model.clone(),
    )?;

    let bytes = tokio::fs::read(file).await?;
    let store = config
        .voice
        .temp_dir
        .clone()
        .map_or_else(TempAudioStore::default, TempAudioStore::new);
    let audio = store.store(&bytes)?;

    let result = stt.transcribe(&audio, &language).await?;
    match result.text() {
        Some(text) => println!("{text}"),
        None => anyhow::bail!("no transcription text found in response"),
    }

    Ok(())
}

/// Synthesize text through the TTS vendor and save it
async fn speak(
    config: &Config,
    text: &str,
    language: Option<String>,
    out: &std::path::Path,
) -> anyhow::Result<()> {
    let language = language.unwrap_or_else(|| config.voice.default_language.clone());
    let tts = SarvamTts::new(&config.api_keys.sarvam, &config.sarvam_base_url)?
        .with_model(config.voice.tts_model.clone())
        .with_speaker(config.voice.tts_speaker.clone());

    let synthesis = tts.synthesize(text, &language).await?;
    let Some(audio_base64) = synthesis.first() else {
        anyhow::bail!("no audio returned from TTS");
    };

    let audio = decode_audio(audio_base64)?;
    tokio::fs::write(out, &audio).await?;
    println!("Saved {} bytes of audio to {}", audio.len(), out.display());

    Ok(())
}
