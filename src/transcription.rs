//! Offline transcription of captured audio.
//!
//! Recognition itself is delegated to a [`Transcriber`]; this module only
//! checks the input, assembles the recognized phrases and saves the text.

use async_trait::async_trait;
use std::path::Path;

use crate::assets::write_file_atomic;
use crate::defaults::output::TRANSCRIPTION_FILE;
use crate::error::MistyError;

/// Speech recognizer for a WAV file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Recognized phrases in order. Empty when no speech was detected.
    async fn transcribe(&self, wav_path: &Path) -> Result<Vec<String>, MistyError>;
}

/// Join non-empty phrases with single spaces.
pub fn join_phrases(phrases: &[String]) -> String {
    phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transcribe `wav_path` and save the text to `output` (default
/// `./transcription.txt`).
///
/// Returns `Ok(None)` when no speech was recognized; nothing is written then.
pub async fn transcribe_file(
    transcriber: &dyn Transcriber,
    wav_path: &Path,
    output: Option<&Path>,
) -> Result<Option<String>, MistyError> {
    let output = output.unwrap_or_else(|| Path::new(TRANSCRIPTION_FILE));
    tokio::fs::metadata(wav_path)
        .await
        .map_err(|e| MistyError::io(wav_path, e))?;

    tracing::info!(file = %wav_path.display(), "transcribing speech to text");
    let phrases = transcriber.transcribe(wav_path).await?;
    let text = join_phrases(&phrases);
    if text.is_empty() {
        tracing::warn!(file = %wav_path.display(), "no speech detected");
        return Ok(None);
    }

    write_file_atomic(output, text.as_bytes()).await?;
    tracing::info!(output = %output.display(), chars = text.len(), "transcription saved");
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Vec<&'static str>);

    #[async_trait]
    impl Transcriber for Canned {
        async fn transcribe(&self, _wav_path: &Path) -> Result<Vec<String>, MistyError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl Transcriber for Failing {
        async fn transcribe(&self, _wav_path: &Path) -> Result<Vec<String>, MistyError> {
            Err(MistyError::Transcription("model not loaded".into()))
        }
    }

    #[test]
    fn phrases_are_joined_with_single_spaces() {
        let phrases = vec!["hello".to_string(), "".to_string(), " misty ".to_string()];
        assert_eq!(join_phrases(&phrases), "hello misty");
    }

    #[tokio::test]
    async fn saves_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("capture_Dialogue.wav");
        std::fs::write(&wav, b"RIFF").unwrap();
        let out = dir.path().join("transcription.txt");

        let text = transcribe_file(&Canned(vec!["hi", "there"]), &wav, Some(&out))
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("hi there"));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hi there");
    }

    #[tokio::test]
    async fn no_speech_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("silence.wav");
        std::fs::write(&wav, b"RIFF").unwrap();
        let out = dir.path().join("transcription.txt");

        let text = transcribe_file(&Canned(vec![]), &wav, Some(&out)).await.unwrap();
        assert!(text.is_none());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcribe_file(
            &Canned(vec!["x"]),
            &dir.path().join("nope.wav"),
            Some(&dir.path().join("t.txt")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[tokio::test]
    async fn recognizer_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("a.wav");
        std::fs::write(&wav, b"RIFF").unwrap();
        let err = transcribe_file(&Failing, &wav, Some(&dir.path().join("t.txt")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transcription);
    }
}
