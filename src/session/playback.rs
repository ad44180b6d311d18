//! Playback controller: the single synthesized-audio slot.
//!
//! [`AudioArtifact`] is decoded from the service's payload reference
//! (`data:` URL or bare base64).  [`PlaybackController`] holds at most one
//! artifact; replacing it drops the previous one.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The payload reference was not valid base64 / data URL.
    #[error("audio payload could not be decoded: {0}")]
    Decode(String),

    /// The payload decoded to zero bytes.
    #[error("audio payload is empty")]
    Empty,

    /// `download_to` was called with no artifact loaded.
    #[error("no audio to download")]
    NothingToDownload,

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// AudioArtifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    bytes: Vec<u8>,
    mime_type: String,
}

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decode a payload reference.
    ///
    /// A `data:<mime>;base64,<data>` URL carries its own MIME type, which
    /// wins over `declared_mime`.
    pub fn from_payload(reference: &str, declared_mime: &str) -> Result<Self, PlaybackError> {
        let reference = reference.trim();

        let (mime, encoded) = match reference.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| PlaybackError::Decode("data URL has no ',' separator".into()))?;
                let mime = header.strip_suffix(";base64").ok_or_else(|| {
                    PlaybackError::Decode("data URL is not base64-encoded".into())
                })?;
                let mime = if mime.is_empty() { declared_mime } else { mime };
                (mime, data)
            }
            None => (declared_mime, reference),
        };

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;

        if bytes.is_empty() {
            return Err(PlaybackError::Empty);
        }

        Ok(Self::new(bytes, mime))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A `data:` URL any HTML/media player can load directly.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Write the artifact to `dir/<stem>.<ext>`, creating `dir` as needed.
    /// Returns the written path.
    pub fn write_to(&self, dir: &Path, stem: &str) -> Result<PathBuf, PlaybackError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", stem, self.file_extension()));
        std::fs::write(&path, &self.bytes)?;

        log::info!("playback: wrote {} bytes to {}", self.len(), path.display());
        Ok(path)
    }

    /// File extension for downloads, from the MIME subtype.
    pub fn file_extension(&self) -> &'static str {
        let essence = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" => "ogg",
            "audio/webm" => "webm",
            "audio/flac" => "flac",
            "audio/aac" => "aac",
            _ => "bin",
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    current: Option<AudioArtifact>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new artifact, dropping any previous one.
    pub fn replace(&mut self, artifact: AudioArtifact) {
        if let Some(old) = self.current.replace(artifact) {
            log::debug!("playback: replaced {} byte artifact", old.len());
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&AudioArtifact> {
        self.current.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.current.is_some()
    }

    /// Write the current artifact with [`AudioArtifact::write_to`].
    pub fn download_to(&self, dir: &Path, stem: &str) -> Result<PathBuf, PlaybackError> {
        self.current
            .as_ref()
            .ok_or(PlaybackError::NothingToDownload)?
            .write_to(dir, stem)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decodes_bare_base64_with_declared_mime() {
        let artifact = AudioArtifact::from_payload("SUQzBA==", "audio/mpeg").unwrap();
        assert_eq!(artifact.bytes(), b"ID3\x04");
        assert_eq!(artifact.mime_type(), "audio/mpeg");
    }

    #[test]
    fn data_url_mime_wins() {
        let artifact = AudioArtifact::from_payload("data:audio/wav;base64,UklGRg==", "audio/mpeg")
            .unwrap();
        assert_eq!(artifact.bytes(), b"RIFF");
        assert_eq!(artifact.mime_type(), "audio/wav");
        assert_eq!(artifact.file_extension(), "wav");
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(matches!(
            AudioArtifact::from_payload("not base64!!", "audio/mpeg"),
            Err(PlaybackError::Decode(_))
        ));
        assert!(matches!(
            AudioArtifact::from_payload("data:audio/wav,plain", "audio/mpeg"),
            Err(PlaybackError::Decode(_))
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(
            AudioArtifact::from_payload("", "audio/mpeg"),
            Err(PlaybackError::Empty)
        ));
    }

    #[test]
    fn data_url_round_trips_through_from_payload() {
        let artifact = AudioArtifact::new(vec![1, 2, 3, 4], "audio/ogg");
        let again = AudioArtifact::from_payload(&artifact.data_url(), "audio/mpeg").unwrap();
        assert_eq!(again, artifact);
    }

    #[test]
    fn unknown_mime_gets_bin_extension() {
        let artifact = AudioArtifact::new(vec![0], "application/octet-stream");
        assert_eq!(artifact.file_extension(), "bin");
        let mp3 = AudioArtifact::new(vec![0], "audio/mpeg; charset=binary");
        assert_eq!(mp3.file_extension(), "mp3");
    }

    #[test]
    fn replace_keeps_only_latest() {
        let mut player = PlaybackController::new();
        player.replace(AudioArtifact::new(vec![1], "audio/mpeg"));
        player.replace(AudioArtifact::new(vec![2, 2], "audio/wav"));

        let current = player.current().unwrap();
        assert_eq!(current.bytes(), &[2u8, 2]);
        assert_eq!(current.mime_type(), "audio/wav");
    }

    #[test]
    fn download_writes_file_with_extension() {
        let dir = tempdir().expect("temp dir");
        let mut player = PlaybackController::new();
        player.replace(AudioArtifact::new(b"RIFF".to_vec(), "audio/wav"));

        let path = player.download_to(&dir.path().join("out"), "verse").unwrap();

        assert_eq!(path.file_name().unwrap(), "verse.wav");
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }

    #[test]
    fn detached_artifact_writes_after_slot_is_cleared() {
        let dir = tempdir().expect("temp dir");
        let mut player = PlaybackController::new();
        player.replace(AudioArtifact::new(b"ID3".to_vec(), "audio/mpeg"));

        let artifact = player.current().cloned().unwrap();
        player.clear();
        let path = artifact.write_to(dir.path(), "take-2").unwrap();

        assert_eq!(path.file_name().unwrap(), "take-2.mp3");
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3");
    }

    #[test]
    fn download_without_audio_fails() {
        let dir = tempdir().expect("temp dir");
        let player = PlaybackController::new();
        assert!(matches!(
            player.download_to(dir.path(), "verse"),
            Err(PlaybackError::NothingToDownload)
        ));
    }
}
