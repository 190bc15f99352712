//! Voice processing module
//!
//! Temp storage for uploaded audio plus the speech vendor adapters.

mod stt;
mod temp;
mod tts;

pub use stt::{SarvamStt, Transcriber, Transcription};
pub use temp::{TempAudio, TempAudioStore};
pub use tts::{SarvamTts, Synthesis, Synthesizer, decode_audio};
