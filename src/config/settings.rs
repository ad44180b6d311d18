//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`: a partial `settings.toml` keeps the
//! keys it names and fills the rest from the defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::session::{Flow, Genre, Mood};

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote studio service (corpora, generation,
/// speech synthesis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the service, without a trailing slash
    /// (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Bearer token — `None` for services that require no authentication.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for any single request.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// ParameterBounds
// ---------------------------------------------------------------------------

/// Advisory bounds for the numeric generation parameters.
///
/// Only the command surface clamps against these; the controller never
/// rejects a request because a value is out of range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub min_length: u32,
    pub max_length: u32,
    pub min_order: u32,
    pub max_order: u32,
    pub min_temperature: f32,
    pub max_temperature: f32,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 2000,
            min_order: 1,
            max_order: 6,
            min_temperature: 0.1,
            max_temperature: 2.0,
        }
    }
}

impl ParameterBounds {
    pub fn clamp_length(&self, value: u32) -> u32 {
        value.clamp(self.min_length, self.max_length)
    }

    pub fn clamp_order(&self, value: u32) -> u32 {
        value.clamp(self.min_order, self.max_order)
    }

    pub fn clamp_temperature(&self, value: f32) -> f32 {
        value.clamp(self.min_temperature, self.max_temperature)
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Starting values for the numeric generation parameters of a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Desired output length, in words.
    pub length: u32,
    /// Markov model order (context size in words).
    pub order: u32,
    /// Sampling temperature.  Higher = more surprising output.
    pub temperature: f32,
    /// Advisory bounds applied by the command surface.
    pub bounds: ParameterBounds,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: 200,
            order: 2,
            temperature: 0.8,
            bounds: ParameterBounds::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// StyleConfig
// ---------------------------------------------------------------------------

/// Style defaults applied to a generation request when the session leaves a
/// knob unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub genre: Genre,
    pub flow: Flow,
    /// Beats per minute.
    pub bpm: u16,
    pub mood: Mood,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            genre: Genre::default(),
            flow: Flow::default(),
            bpm: 90,
            mood: Mood::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Speech synthesis defaults applied when the session leaves a knob unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Voice identifier understood by the service.
    pub voice: String,
    /// ISO-639-1 language code.
    pub language: String,
    /// Ask the synthesizer for slower speech.
    pub slow: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: "default".into(),
            language: "en".into(),
            slow: false,
        }
    }
}

// ---------------------------------------------------------------------------
// StatusConfig / OutputConfig
// ---------------------------------------------------------------------------

/// Status surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Number of past status entries kept in the history log.
    pub history_capacity: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
        }
    }
}

/// Where downloaded audio artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub download_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: AppPaths::new().download_dir,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use verse_studio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote service connection.
    pub service: ServiceConfig,
    /// Numeric generation defaults and bounds.
    pub generation: GenerationConfig,
    /// Style knob defaults.
    pub style: StyleConfig,
    /// Speech knob defaults.
    pub speech: SpeechConfig,
    /// Status surface settings.
    pub status: StatusConfig,
    /// Audio download settings.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialise settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
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
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let config = AppConfig::default();
        config.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.service.base_url, config.service.base_url);
        assert_eq!(loaded.generation.order, config.generation.order);
        assert_eq!(loaded.style.genre, config.style.genre);
        assert_eq!(loaded.speech.language, config.speech.language);
        assert_eq!(loaded.output.download_dir, config.output.download_dir);
    }

    #[test]
    fn missing_file_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nope.toml");

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.service.timeout_secs, 60);
    }

    #[test]
    fn partial_file_keeps_named_keys_and_defaults_the_rest() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[service]\nbase_url = \"https://studio.example.com\"\n\n[style]\nbpm = 120\n",
        )
        .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");

        assert_eq!(cfg.service.base_url, "https://studio.example.com");
        assert_eq!(cfg.service.timeout_secs, 60);
        assert_eq!(cfg.style.bpm, 120);
        assert_eq!(cfg.style.genre, Genre::Pop);
        assert_eq!(cfg.generation.order, 2);
        assert_eq!(cfg.generation.bounds.max_order, 6);
    }

    #[test]
    fn malformed_file_error_names_the_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[service\nbase_url = ").expect("write");

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.toml"));
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert!(cfg.service.api_key.is_none());
        assert_eq!(cfg.generation.length, 200);
        assert_eq!(cfg.generation.order, 2);
        assert!((cfg.generation.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(cfg.style.bpm, 90);
        assert_eq!(cfg.speech.voice, "default");
        assert!(!cfg.speech.slow);
        assert_eq!(cfg.status.history_capacity, 50);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.service.base_url = "https://studio.example.com".into();
        cfg.service.api_key = Some("secret".into());
        cfg.generation.order = 4;
        cfg.style.genre = Genre::HipHop;
        cfg.style.mood = Mood::Dark;
        cfg.speech.slow = true;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.service.base_url, "https://studio.example.com");
        assert_eq!(loaded.service.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.generation.order, 4);
        assert_eq!(loaded.style.genre, Genre::HipHop);
        assert_eq!(loaded.style.mood, Mood::Dark);
        assert!(loaded.speech.slow);
    }

    #[test]
    fn bounds_clamp_out_of_range_values() {
        let bounds = ParameterBounds::default();

        assert_eq!(bounds.clamp_length(5), 20);
        assert_eq!(bounds.clamp_length(10_000), 2000);
        assert_eq!(bounds.clamp_order(0), 1);
        assert_eq!(bounds.clamp_order(3), 3);
        assert!((bounds.clamp_temperature(9.0) - 2.0).abs() < f32::EPSILON);
    }
}
