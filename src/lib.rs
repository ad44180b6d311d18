//! Verse Studio — client-side session controller for a lyric generation
//! service.
//!
//! The service stores corpora, generates text and synthesizes speech; this
//! crate sequences those requests, validates their preconditions and keeps
//! one coherent session state (library, output, audio, status).

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod repl;
pub mod session;
