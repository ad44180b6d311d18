//! Session parameters: the mutable inputs of one content-creation session.
//!
//! [`SessionParameters`] is a plain state holder.  Nothing here validates;
//! the controller checks preconditions at the moment an action is triggered,
//! so an edit made while a request is in flight only affects the next one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppConfig, SpeechConfig, StyleConfig};

// ---------------------------------------------------------------------------
// Knob enums
// ---------------------------------------------------------------------------

/// A knob value that could not be parsed from user input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown {knob} '{value}' (expected one of: {expected})")]
pub struct ParseKnobError {
    pub knob: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_knob<T: Copy>(
    knob: &'static str,
    input: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, ParseKnobError> {
    let wanted = input.trim().to_ascii_lowercase();
    all.iter()
        .find(|v| name(v) == wanted)
        .copied()
        .ok_or_else(|| ParseKnobError {
            knob,
            value: input.to_string(),
            expected: all.iter().map(name).collect::<Vec<_>>().join(", "),
        })
}

/// Musical genre the lyrics should lean towards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    #[default]
    Pop,
    HipHop,
    Rock,
    Country,
    Rnb,
    Folk,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Pop,
        Genre::HipHop,
        Genre::Rock,
        Genre::Country,
        Genre::Rnb,
        Genre::Folk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Pop => "pop",
            Genre::HipHop => "hiphop",
            Genre::Rock => "rock",
            Genre::Country => "country",
            Genre::Rnb => "rnb",
            Genre::Folk => "folk",
        }
    }
}

impl FromStr for Genre {
    type Err = ParseKnobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_knob("genre", s, &Genre::ALL, Genre::as_str)
    }
}

/// Rhythmic delivery of the lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    #[default]
    Steady,
    Syncopated,
    Triplet,
    Freestyle,
}

impl Flow {
    pub const ALL: [Flow; 4] = [Flow::Steady, Flow::Syncopated, Flow::Triplet, Flow::Freestyle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Steady => "steady",
            Flow::Syncopated => "syncopated",
            Flow::Triplet => "triplet",
            Flow::Freestyle => "freestyle",
        }
    }
}

impl FromStr for Flow {
    type Err = ParseKnobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_knob("flow", s, &Flow::ALL, Flow::as_str)
    }
}

/// Emotional colour of the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Dark,
    Romantic,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Neutral,
        Mood::Happy,
        Mood::Sad,
        Mood::Dark,
        Mood::Romantic,
        Mood::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Dark => "dark",
            Mood::Romantic => "romantic",
            Mood::Angry => "angry",
        }
    }
}

impl FromStr for Mood {
    type Err = ParseKnobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_knob("mood", s, &Mood::ALL, Mood::as_str)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StyleKnobs
// ---------------------------------------------------------------------------

/// Stylistic controls.  Every knob is independently optional; unset knobs
/// fall back to the configured defaults when a request is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleKnobs {
    pub genre: Option<Genre>,
    pub flow: Option<Flow>,
    pub bpm: Option<u16>,
    pub mood: Option<Mood>,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub slow: Option<bool>,
}

/// Generation-side style knobs with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub genre: Genre,
    pub flow: Flow,
    pub bpm: u16,
    pub mood: Mood,
}

/// Speech-side knobs with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVoice {
    pub voice: String,
    pub language: String,
    pub slow: bool,
}

impl StyleKnobs {
    pub fn resolve_style(&self, defaults: &StyleConfig) -> ResolvedStyle {
        ResolvedStyle {
            genre: self.genre.unwrap_or(defaults.genre),
            flow: self.flow.unwrap_or(defaults.flow),
            bpm: self.bpm.unwrap_or(defaults.bpm),
            mood: self.mood.unwrap_or(defaults.mood),
        }
    }

    /// Blank voice/language strings count as unset.
    pub fn resolve_voice(&self, defaults: &SpeechConfig) -> ResolvedVoice {
        let pick = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        ResolvedVoice {
            voice: pick(&self.voice, &defaults.voice),
            language: pick(&self.language, &defaults.language),
            slow: self.slow.unwrap_or(defaults.slow),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionParameters
// ---------------------------------------------------------------------------

/// Everything the user can edit during a session.
///
/// The numeric bounds in [`crate::config::ParameterBounds`] are advisory;
/// this struct stores whatever it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParameters {
    /// Title used when saving the source text as a corpus.
    pub title: String,
    /// Lyrics / poem the model learns from.
    pub source_text: String,
    /// Desired output length, in words.
    pub length: u32,
    /// Markov model order.
    pub order: u32,
    pub temperature: f32,
    /// Optional opening phrase for the generated text.
    pub seed: Option<String>,
    pub style: StyleKnobs,
}

impl SessionParameters {
    /// Fresh parameters for a new session, seeded from config defaults.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            title: String::new(),
            source_text: String::new(),
            length: config.generation.length,
            order: config.generation.order,
            temperature: config.generation.temperature,
            seed: None,
            style: StyleKnobs::default(),
        }
    }

    /// The title to send when saving, `"Untitled"` when blank.
    pub fn effective_title(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled".to_string()
        } else {
            title.to_string()
        }
    }

    /// The seed phrase to send, `None` when blank.
    pub fn effective_seed(&self) -> Option<String> {
        self.seed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// `true` when the trimmed source text is longer than the model order,
    /// the only precondition for saving or generating from raw text.
    pub fn has_enough_source(&self) -> bool {
        self.source_text.trim().chars().count() > self.order as usize
    }
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
