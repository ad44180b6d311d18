//! Status surface: one human-readable slot plus a bounded history.
//!
//! ```text
//! Idle ──action triggered──▶ Busy("Generating…")
//!                            ──settled──▶ Succeeded(msg) | Failed(reason)
//! Succeeded / Failed ──next action──▶ Busy(…)
//! ```
//!
//! Each transition overwrites the slot.  The history exists for richer
//! front ends; the contract is only that [`StatusBoard::current`] holds the
//! latest outcome of the latest action.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// OperationStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OperationStatus {
    /// Nothing has been triggered yet.
    #[default]
    Idle,
    /// An action is outstanding.
    Busy(String),
    /// The last action completed.
    Succeeded(String),
    /// The last action failed; the message is user-facing.
    Failed(String),
}

impl OperationStatus {
    /// Returns `true` while an action is outstanding.
    ///
    /// Front ends use this to disable action triggers.
    ///
    /// ```
    /// use verse_studio::session::OperationStatus;
    ///
    /// assert!(!OperationStatus::Idle.is_busy());
    /// assert!(OperationStatus::Busy("Generating…".into()).is_busy());
    /// assert!(!OperationStatus::Failed("nope".into()).is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, OperationStatus::Busy(_))
    }

    /// A short label suitable for a status bar prefix.
    pub fn label(&self) -> &'static str {
        match self {
            OperationStatus::Idle => "Idle",
            OperationStatus::Busy(_) => "Working",
            OperationStatus::Succeeded(_) => "Done",
            OperationStatus::Failed(_) => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OperationStatus::Idle => "",
            OperationStatus::Busy(m) | OperationStatus::Succeeded(m) | OperationStatus::Failed(m) => {
                m
            }
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Idle => f.write_str(self.label()),
            _ => write!(f, "{}: {}", self.label(), self.message()),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusBoard
// ---------------------------------------------------------------------------

/// One entry of the status history.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub at: DateTime<Utc>,
    pub status: OperationStatus,
}

#[derive(Debug, Clone)]
pub struct StatusBoard {
    current: OperationStatus,
    history: VecDeque<StatusEntry>,
    capacity: usize,
}

impl StatusBoard {
    /// A board keeping at most `capacity` history entries (0 disables history).
    pub fn new(capacity: usize) -> Self {
        Self {
            current: OperationStatus::Idle,
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Overwrite the slot and log the transition.
    pub fn set(&mut self, status: OperationStatus) {
        if self.capacity > 0 {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(StatusEntry {
                at: Utc::now(),
                status: status.clone(),
            });
        }
        self.current = status;
    }

    pub fn current(&self) -> &OperationStatus {
        &self.current
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StatusEntry> {
        self.history.iter()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(50)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_idle() {
        assert_eq!(OperationStatus::default(), OperationStatus::Idle);
        assert_eq!(StatusBoard::default().current(), &OperationStatus::Idle);
    }

    #[test]
    fn labels() {
        assert_eq!(OperationStatus::Idle.label(), "Idle");
        assert_eq!(OperationStatus::Busy("x".into()).label(), "Working");
        assert_eq!(OperationStatus::Succeeded("x".into()).label(), "Done");
        assert_eq!(OperationStatus::Failed("x".into()).label(), "Error");
    }

    #[test]
    fn display_includes_message() {
        let status = OperationStatus::Failed("Service unavailable".into());
        assert_eq!(status.to_string(), "Error: Service unavailable");
        assert_eq!(OperationStatus::Idle.to_string(), "Idle");
    }

    #[test]
    fn set_overwrites_current() {
        let mut board = StatusBoard::new(10);
        board.set(OperationStatus::Busy("Generating…".into()));
        board.set(OperationStatus::Succeeded("Done generating.".into()));

        assert_eq!(
            board.current(),
            &OperationStatus::Succeeded("Done generating.".into())
        );
        assert_eq!(board.history().count(), 2);
    }

    #[test]
    fn history_is_bounded() {
        let mut board = StatusBoard::new(2);
        board.set(OperationStatus::Busy("1".into()));
        board.set(OperationStatus::Busy("2".into()));
        board.set(OperationStatus::Busy("3".into()));

        let messages: Vec<_> = board.history().map(|e| e.status.message().to_string()).collect();
        assert_eq!(messages, vec!["2", "3"]);
    }

    #[test]
    fn zero_capacity_keeps_only_current() {
        let mut board = StatusBoard::new(0);
        board.set(OperationStatus::Failed("x".into()));

        assert_eq!(board.history().count(), 0);
        assert!(matches!(board.current(), OperationStatus::Failed(_)));
    }
}
