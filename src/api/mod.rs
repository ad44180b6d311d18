//! Remote studio service boundary.
//!
//! This module provides:
//! * [`StudioService`] — async trait for the four remote operations
//!   (list corpora, create corpus, generate, synthesize speech).
//! * [`HttpStudioService`] — reqwest implementation against the JSON API.
//! * Wire types ([`CorpusRecord`], [`GenerateRequest`], …).
//! * [`ApiError`] — service / transport / decode failures.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use verse_studio::api::{HttpStudioService, StudioService};
//! use verse_studio::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let service = HttpStudioService::from_config(&config.service);
//!
//!     for corpus in service.list_corpora().await.unwrap() {
//!         println!("{} {}", corpus.id, corpus.title);
//!     }
//! }
//! ```

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiError, HttpStudioService, StudioService};
pub use types::{
    CorpusId, CorpusRecord, CreateCorpusRequest, GenerateRequest, GenerateResponse,
    GenerationSource, SpeechRequest, SpeechResponse,
};
