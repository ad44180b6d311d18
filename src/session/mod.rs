//! Session leaf components.
//!
//! * [`SessionParameters`] — user-editable inputs and style knobs.
//! * [`CorpusLibrary`] — local mirror of the service's corpora + selection.
//! * [`StatusBoard`] / [`OperationStatus`] — the single status slot.
//! * [`PlaybackController`] / [`AudioArtifact`] — the single audio slot.
//!
//! None of these talk to the network; the controller owns all sequencing.

pub mod library;
pub mod params;
pub mod playback;
pub mod status;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use library::{CorpusLibrary, RefreshFailure};
pub use params::{
    Flow, Genre, Mood, ParseKnobError, ResolvedStyle, ResolvedVoice, SessionParameters,
    StyleKnobs,
};
pub use playback::{AudioArtifact, PlaybackController, PlaybackError};
pub use status::{OperationStatus, StatusBoard, StatusEntry};
