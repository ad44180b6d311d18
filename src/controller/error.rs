//! User-facing action errors.
//!
//! All three kinds end up as a single string on the status surface; the
//! kind is kept so callers and tests can tell them apart.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// A local precondition failed.  No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The service answered with a failure.  Carries the service's detail
    /// verbatim when it sent one.
    #[error("{0}")]
    Service(String),

    /// The request could not be completed or its response not understood.
    #[error("{0}")]
    Transport(String),
}

impl ActionError {
    /// Map a remote failure onto the user-facing taxonomy.
    ///
    /// `generic` is shown whenever the service gave no detail, and always
    /// for transport/decode failures.
    pub fn from_api(err: &ApiError, generic: &str) -> Self {
        match err {
            ApiError::Service {
                detail: Some(detail),
                ..
            } => ActionError::Service(detail.clone()),
            ApiError::Service { detail: None, .. } => ActionError::Service(generic.to_string()),
            ApiError::Transport(_) | ApiError::Decode(_) => {
                ActionError::Transport(generic.to_string())
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ActionError::Validation(m) | ActionError::Service(m) | ActionError::Transport(m) => m,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}
