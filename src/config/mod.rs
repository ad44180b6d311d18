//! Configuration module for Verse Studio.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the service
//! connection and each knob family, `AppPaths` for cross-platform
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, GenerationConfig, OutputConfig, ParameterBounds, ServiceConfig, SpeechConfig,
    StatusConfig, StyleConfig,
};
