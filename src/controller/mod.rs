//! Session controller module for Verse Studio.
//!
//! This module sequences every network operation of a session and keeps
//! the shared session state coherent while requests overlap.
//!
//! # Architecture
//!
//! ```text
//! front end (commands)
//!        │
//!        ▼
//! SessionController  ← async, &self, actions may overlap
//!        │
//!        ├─ refresh_library        → list corpora           [Listing]
//!        ├─ save_corpus            → create corpus          (prepend)
//!        ├─ generate / _from_selected → generate            [Output, Audio]
//!        ├─ speak_text / speak_output → synthesize          [Audio]
//!        └─ generate_and_speak     → generate, then synthesize its text
//!
//! SharedSession (Arc<Mutex<SessionState>>) ←─── read by the front end
//! ```
//!
//! Every action also claims the status slot.  Completions only write the
//! slots their ticket still owns.

pub mod error;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::ActionError;
pub use runner::{SessionController, Settled, SourceChoice};
pub use state::{lock_session, new_shared_session, SessionState, SharedSession, Slot, Ticket};
