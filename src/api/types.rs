//! Wire types exchanged with the studio service.
//!
//! These are the shapes the controller depends on; the service owns the
//! full schema.  Records returned by the service are treated as ground
//! truth and never have fields synthesized locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Flow, Genre, Mood};

/// Opaque corpus identifier assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusId(pub String);

impl std::fmt::Display for CorpusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorpusId {
    fn from(s: &str) -> Self {
        CorpusId(s.to_string())
    }
}

/// A persisted corpus as listed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub id: CorpusId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Body of the "create corpus" call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCorpusRequest {
    pub title: String,
    pub text: String,
}

/// What the model should learn from.  Exactly one of the two is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Text(String),
    CorpusId(CorpusId),
}

/// Body of the "generate" call.  Carries every style knob, the voice ones
/// included, with defaults already applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub source: GenerationSource,
    pub length: u32,
    pub order: u32,
    pub temperature: f32,
    pub seed: Option<String>,
    pub genre: Genre,
    pub flow: Flow,
    pub bpm: u16,
    pub mood: Mood,
    pub voice: String,
    pub lang: String,
    pub slow: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// Body of the "synthesize speech" call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub lang: String,
    pub slow: bool,
}

/// Synthesized audio as returned by the service.
///
/// `audio` is a payload reference: either a `data:` URL or bare base64.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeechResponse {
    pub audio: String,
    #[serde(default = "default_mime")]
    pub mime: String,
}

fn default_mime() -> String {
    "audio/mpeg".to_string()
}

/// Error body the service sends alongside non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
