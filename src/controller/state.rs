//! Session state and request sequencing.
//!
//! [`SessionState`] is the single source of truth for one session:
//! parameters, corpus library, generated text, audio slot and status.
//! [`SharedSession`] is a type alias for `Arc<Mutex<SessionState>>` — cheap
//! to clone and safe to share with front ends.
//!
//! # Sequencing
//!
//! Every triggered action is issued a [`Ticket`] from a monotonically
//! increasing counter and claims the slots it will write.  A completion may
//! only write a slot whose latest claim is still its own ticket, so the most
//! recently triggered action always wins regardless of completion order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::AppConfig;
use crate::session::{CorpusLibrary, OperationStatus, PlaybackController, SessionParameters, StatusBoard};

// ---------------------------------------------------------------------------
// Slot / Ticket
// ---------------------------------------------------------------------------

/// A piece of shared state written by action completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The status surface.  Claimed by every action.
    Status,
    /// The generated text.
    Output,
    /// The synthesized audio artifact.
    Audio,
    /// The corpus listing (wholesale refresh).
    Listing,
}

/// Sequence number handed to an action when it is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Claims {
    status: u64,
    output: u64,
    audio: u64,
    listing: u64,
}

impl Claims {
    fn get_mut(&mut self, slot: Slot) -> &mut u64 {
        match slot {
            Slot::Status => &mut self.status,
            Slot::Output => &mut self.output,
            Slot::Audio => &mut self.audio,
            Slot::Listing => &mut self.listing,
        }
    }

    fn get(&self, slot: Slot) -> u64 {
        match slot {
            Slot::Status => self.status,
            Slot::Output => self.output,
            Slot::Audio => self.audio,
            Slot::Listing => self.listing,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

pub struct SessionState {
    /// User-editable inputs.  Writable at any time, including mid-flight.
    pub params: SessionParameters,

    /// Local mirror of the service's corpora plus the selection pointer.
    pub library: CorpusLibrary,

    /// Output of the last successful generation; empty until one completes
    /// and cleared whenever a new generation is dispatched.
    pub generated_text: String,

    /// The single synthesized-audio slot.
    pub playback: PlaybackController,

    /// Single-slot status plus history.
    pub status: StatusBoard,

    last_ticket: u64,
    claims: Claims,
}

impl SessionState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            params: SessionParameters::from_config(config),
            library: CorpusLibrary::new(),
            generated_text: String::new(),
            playback: PlaybackController::new(),
            status: StatusBoard::new(config.status.history_capacity),
            last_ticket: 0,
            claims: Claims::default(),
        }
    }

    /// Issue the next ticket, claiming the status slot plus `slots`.
    pub fn issue(&mut self, slots: &[Slot]) -> Ticket {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.claims.status = ticket;
        for slot in slots {
            *self.claims.get_mut(*slot) = ticket;
        }
        Ticket(ticket)
    }

    /// `true` when no action triggered after `ticket` has claimed `slot`.
    pub fn owns(&self, ticket: Ticket, slot: Slot) -> bool {
        self.claims.get(slot) == ticket.0
    }

    /// Set the status only if `ticket` still owns it.  Returns whether it
    /// was written.
    pub fn report(&mut self, ticket: Ticket, status: OperationStatus) -> bool {
        if self.owns(ticket, Slot::Status) {
            self.status.set(status);
            true
        } else {
            log::debug!(
                "session: dropping stale status from ticket {} ({status})",
                ticket.value()
            );
            false
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status.current().is_busy()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock with [`lock_session`] for a short critical section; do **not** hold
/// the lock across `.await` points.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedSession`] for a fresh session.
pub fn new_shared_session(config: &AppConfig) -> SharedSession {
    Arc::new(Mutex::new(SessionState::new(config)))
}

/// Lock the session, recovering the data if a previous holder panicked.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
