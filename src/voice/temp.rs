//! Temporary storage for inbound audio
//!
//! The transcription vendor takes a file, so uploads are written to a
//! uniquely named temp file first. The file lives exactly as long as the
//! [`TempAudio`] handle and is removed when the handle is released or dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::Result;

const TEMP_PREFIX: &str = "workmates-audio-";
const TEMP_SUFFIX: &str = ".wav";

/// Creates temp audio files in a fixed directory
#[derive(Debug, Clone)]
pub struct TempAudioStore {
    dir: PathBuf,
}

impl Default for TempAudioStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl TempAudioStore {
    /// Create a store writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory temp files are created in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh temp file
    ///
    /// The file is fully written and closed before the handle is returned.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn store(&self, bytes: &[u8]) -> Result<TempAudio> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)?;

        file.write_all(bytes)?;
        file.flush()?;

        let path = file.into_temp_path();
        tracing::info!(
            path = %path.display(),
            audio_bytes = bytes.len(),
            "saved incoming audio to temp file"
        );

        Ok(TempAudio {
            path: Some(path),
            len: bytes.len(),
        })
    }
}

/// Handle to a stored audio file; deletes the file on release or drop
#[derive(Debug)]
pub struct TempAudio {
    path: Option<TempPath>,
    len: usize,
}

impl TempAudio {
    /// Location of the file on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Number of bytes written
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the stored audio is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// File name component, used as the multipart upload name
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map_or_else(|| "audio.wav".to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Read the stored bytes back for a vendor upload
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path()).await?)
    }

    /// Delete the file now instead of waiting for drop
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => tracing::info!(path = %shown, "deleted temp audio file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %shown, "temp audio file already removed");
            }
            Err(e) => {
                tracing::warn!(path = %shown, error = %e, "failed to delete temp audio file");
            }
        }
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path());

        let audio = store.store(b"RIFF1234").unwrap();

        assert!(audio.path().exists());
        assert_eq!(audio.len(), 8);
        assert_eq!(std::fs::read(audio.path()).unwrap(), b"RIFF1234");
        assert!(audio.file_name().starts_with(TEMP_PREFIX));
        assert!(audio.file_name().ends_with(TEMP_SUFFIX));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path());

        let audio = store.store(b"abc").unwrap();
        let path = audio.path().to_path_buf();
        drop(audio);

        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path());

        let audio = store.store(b"abc").unwrap();
        std::fs::remove_file(audio.path()).unwrap();

        // Must not panic
        audio.release();
    }

    #[test]
    fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path());

        let a = store.store(b"a").unwrap();
        let b = store.store(b"b").unwrap();

        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_store_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path().join("does-not-exist"));

        assert!(store.store(b"abc").is_err());
    }

    #[test]
    fn test_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAudioStore::new(dir.path());

        let audio = store.store(b"hello").unwrap();
        let bytes = tokio_test::block_on(audio.read()).unwrap();
        assert_eq!(bytes, b"hello");
    }
}
