//! Session controller — sequences save / generate / speak requests.
//!
//! [`SessionController`] owns the [`SharedSession`] and the
//! [`StudioService`].  Every action is a short linear pipeline:
//!
//! ```text
//! check precondition ──fail──▶ Failed(validation)          (no request)
//!        │
//!        ▼
//! issue ticket, clear claimed slots, Busy(…)
//!        │
//!        ▼
//! await service call
//!        │
//!        ▼
//! apply result to the slots the ticket still owns, Succeeded / Failed
//! ```
//!
//! Actions take `&self` and may overlap; nothing is queued or cancelled.
//! A completion that lost its slots to a later action is discarded and
//! reported as [`Settled::Superseded`].

use std::sync::{Arc, MutexGuard};

use crate::api::{
    ApiError, CorpusId, CorpusRecord, CreateCorpusRequest, GenerateRequest, GenerationSource,
    SpeechRequest, StudioService,
};
use crate::config::AppConfig;
use crate::session::{AudioArtifact, OperationStatus, RefreshFailure, SessionParameters};

use super::error::ActionError;
use super::state::{lock_session, SessionState, SharedSession, Slot, Ticket};

const SAVE_FAILED: &str = "Could not save corpus.";
const GENERATE_FAILED: &str = "Generation failed.";
const SPEAK_FAILED: &str = "Speech synthesis failed.";
const REFRESH_FAILED: &str = "Could not refresh corpora.";
const FIRST_LOAD_FAILED: &str =
    "Could not load corpora. The corpus store may be unavailable; try refreshing later.";

// ---------------------------------------------------------------------------
// Settled / SourceChoice
// ---------------------------------------------------------------------------

/// How a successful remote call ended up being applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    /// The result was written to session state.
    Applied(T),
    /// A later action claimed the slot first; the result was discarded.
    Superseded,
}

impl<T> Settled<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Settled::Applied(v) => Some(v),
            Settled::Superseded => None,
        }
    }
}

/// What a generation learns from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChoice {
    /// The session's source text.
    RawText,
    /// The currently selected corpus.
    SelectedCorpus,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives one content-creation session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use verse_studio::api::HttpStudioService;
/// use verse_studio::config::AppConfig;
/// use verse_studio::controller::{new_shared_session, SessionController};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let session = new_shared_session(&config);
/// let service = Arc::new(HttpStudioService::from_config(&config.service));
/// let controller = SessionController::new(session, service, config);
///
/// controller.refresh_library().await.ok();
/// controller.with_params(|p| p.source_text = "the rain falls on the roof".into());
/// controller.generate().await.ok();
/// # }
/// ```
pub struct SessionController {
    session: SharedSession,
    service: Arc<dyn StudioService>,
    config: AppConfig,
}

impl SessionController {
    pub fn new(session: SharedSession, service: Arc<dyn StudioService>, config: AppConfig) -> Self {
        Self {
            session,
            service,
            config,
        }
    }

    /// Shared handle for front ends that render the session.
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Edit the session parameters.  Allowed at any time; in-flight requests
    /// keep the values they were dispatched with.
    pub fn with_params<R>(&self, edit: impl FnOnce(&mut SessionParameters) -> R) -> R {
        edit(&mut self.lock().params)
    }

    pub fn select_corpus(&self, id: CorpusId) {
        self.lock().library.select(id);
    }

    pub fn status(&self) -> OperationStatus {
        self.lock().status.current().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_busy()
    }

    pub fn generated_text(&self) -> String {
        self.lock().generated_text.clone()
    }

    // -----------------------------------------------------------------------
    // Corpus library
    // -----------------------------------------------------------------------

    /// Replace the cached corpus list with the service's listing.
    ///
    /// On failure the cache is left untouched; a failure before any listing
    /// was ever loaded reports that the store may be unavailable.
    pub async fn refresh_library(&self) -> Result<Settled<usize>, ActionError> {
        let ticket = {
            let mut st = self.lock();
            let ticket = st.issue(&[Slot::Listing]);
            st.report(ticket, OperationStatus::Busy("Loading corpora…".into()));
            ticket
        };
        log::debug!("controller: refresh #{} dispatched", ticket.value());

        let result = self.service.list_corpora().await;

        let mut st = self.lock();
        match result {
            Ok(records) => {
                if !st.owns(ticket, Slot::Listing) {
                    return Ok(Settled::Superseded);
                }
                let count = records.len();
                st.library.replace_all(records);
                st.report(
                    ticket,
                    OperationStatus::Succeeded(format!("Loaded {count} corpora.")),
                );
                Ok(Settled::Applied(count))
            }
            Err(e) => {
                log::warn!("controller: list corpora failed: {e}");
                let failure = if st.owns(ticket, Slot::Listing) {
                    st.library.refresh_failed()
                } else {
                    RefreshFailure::KeptStale
                };
                let err = match (failure, ActionError::from_api(&e, REFRESH_FAILED)) {
                    (RefreshFailure::FirstLoad, ActionError::Service(detail))
                        if detail != REFRESH_FAILED =>
                    {
                        ActionError::Service(format!("{FIRST_LOAD_FAILED} ({detail})"))
                    }
                    (RefreshFailure::FirstLoad, ActionError::Service(_)) => {
                        ActionError::Service(FIRST_LOAD_FAILED.into())
                    }
                    (RefreshFailure::FirstLoad, _) => ActionError::Transport(FIRST_LOAD_FAILED.into()),
                    (RefreshFailure::KeptStale, err) => err,
                };
                Err(self.fail(&mut st, ticket, err))
            }
        }
    }

    /// Persist the source text as a new corpus.
    ///
    /// The returned record goes to the head of the library even if a later
    /// action has started meanwhile; the selection is left alone.
    pub async fn save_corpus(&self) -> Result<CorpusRecord, ActionError> {
        let (ticket, request) = {
            let mut st = self.lock();
            if let Some(err) = too_short(&st) {
                return Err(self.reject(&mut st, err));
            }
            let request = CreateCorpusRequest {
                title: st.params.effective_title(),
                text: st.params.source_text.clone(),
            };
            let ticket = st.issue(&[]);
            st.report(ticket, OperationStatus::Busy("Saving corpus…".into()));
            (ticket, request)
        };
        log::debug!("controller: save #{} dispatched ({:?})", ticket.value(), request.title);

        let result = self.service.create_corpus(request).await;

        let mut st = self.lock();
        match result {
            Ok(record) => {
                st.library.prepend(record.clone());
                st.report(
                    ticket,
                    OperationStatus::Succeeded(format!("Saved \"{}\".", record.title)),
                );
                Ok(record)
            }
            Err(e) => {
                log::warn!("controller: create corpus failed: {e}");
                Err(self.fail(&mut st, ticket, ActionError::from_api(&e, SAVE_FAILED)))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Generate from the session's raw source text.
    pub async fn generate(&self) -> Result<Settled<String>, ActionError> {
        let (ticket, request) = {
            let mut st = self.lock();
            if let Some(err) = too_short(&st) {
                return Err(self.reject(&mut st, err));
            }
            let source = GenerationSource::Text(st.params.source_text.clone());
            self.begin_generation(&mut st, source)
        };
        self.finish_generation(ticket, request).await
    }

    /// Generate from the selected corpus.
    pub async fn generate_from_selected(&self) -> Result<Settled<String>, ActionError> {
        let (ticket, request) = {
            let mut st = self.lock();
            let Some(id) = st.library.selected().cloned() else {
                return Err(self.reject(
                    &mut st,
                    ActionError::Validation("Pick a corpus first.".into()),
                ));
            };
            self.begin_generation(&mut st, GenerationSource::CorpusId(id))
        };
        self.finish_generation(ticket, request).await
    }

    pub async fn generate_with(&self, source: SourceChoice) -> Result<Settled<String>, ActionError> {
        match source {
            SourceChoice::RawText => self.generate().await,
            SourceChoice::SelectedCorpus => self.generate_from_selected().await,
        }
    }

    /// Build the request from the current parameters, clear the output and
    /// audio slots, and go Busy.
    fn begin_generation(
        &self,
        st: &mut SessionState,
        source: GenerationSource,
    ) -> (Ticket, GenerateRequest) {
        let style = st.params.style.resolve_style(&self.config.style);
        let voice = st.params.style.resolve_voice(&self.config.speech);
        let request = GenerateRequest {
            source,
            length: st.params.length,
            order: st.params.order,
            temperature: st.params.temperature,
            seed: st.params.effective_seed(),
            genre: style.genre,
            flow: style.flow,
            bpm: style.bpm,
            mood: style.mood,
            voice: voice.voice,
            lang: voice.language,
            slow: voice.slow,
        };

        let ticket = st.issue(&[Slot::Output, Slot::Audio]);
        st.generated_text.clear();
        st.playback.clear();
        st.report(ticket, OperationStatus::Busy("Generating…".into()));
        log::debug!("controller: generation #{} dispatched", ticket.value());

        (ticket, request)
    }

    async fn finish_generation(
        &self,
        ticket: Ticket,
        request: GenerateRequest,
    ) -> Result<Settled<String>, ActionError> {
        let result = self.service.generate(request).await;

        let mut st = self.lock();
        match result {
            Ok(response) => {
                if !st.owns(ticket, Slot::Output) {
                    log::debug!("controller: generation #{} superseded", ticket.value());
                    return Ok(Settled::Superseded);
                }
                st.generated_text = response.text.clone();
                st.report(ticket, OperationStatus::Succeeded("Generated new text.".into()));
                Ok(Settled::Applied(response.text))
            }
            Err(e) => {
                log::warn!("controller: generate failed: {e}");
                Err(self.fail(&mut st, ticket, ActionError::from_api(&e, GENERATE_FAILED)))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Speech
    // -----------------------------------------------------------------------

    /// Synthesize the current generated text.
    pub async fn speak_output(&self) -> Result<Settled<()>, ActionError> {
        let text = self.generated_text();
        self.speak_text(&text).await
    }

    /// Synthesize `text`, replacing the audio slot on success.
    pub async fn speak_text(&self, text: &str) -> Result<Settled<()>, ActionError> {
        let (ticket, request) = {
            let mut st = self.lock();
            let text = text.trim();
            if text.is_empty() {
                return Err(self.reject(
                    &mut st,
                    ActionError::Validation("Nothing to speak yet.".into()),
                ));
            }
            let voice = st.params.style.resolve_voice(&self.config.speech);
            let request = SpeechRequest {
                text: text.to_string(),
                voice: voice.voice,
                lang: voice.language,
                slow: voice.slow,
            };
            let ticket = st.issue(&[Slot::Audio]);
            st.playback.clear();
            st.report(ticket, OperationStatus::Busy("Synthesizing…".into()));
            (ticket, request)
        };
        log::debug!("controller: speech #{} dispatched", ticket.value());

        let artifact = match self.service.synthesize(request).await {
            Ok(response) => AudioArtifact::from_payload(&response.audio, &response.mime)
                .map_err(|e| ApiError::Decode(e.to_string())),
            Err(e) => Err(e),
        };

        let mut st = self.lock();
        match artifact {
            Ok(artifact) => {
                if !st.owns(ticket, Slot::Audio) {
                    log::debug!("controller: speech #{} superseded", ticket.value());
                    return Ok(Settled::Superseded);
                }
                st.playback.replace(artifact);
                st.report(ticket, OperationStatus::Succeeded("Audio ready.".into()));
                Ok(Settled::Applied(()))
            }
            Err(e) => {
                log::warn!("controller: synthesize failed: {e}");
                Err(self.fail(&mut st, ticket, ActionError::from_api(&e, SPEAK_FAILED)))
            }
        }
    }

    /// Generate, then speak exactly the text that generation produced.
    ///
    /// Synthesis only starts once the generation has settled and been
    /// applied.  A failed or superseded generation ends the pipeline; a
    /// failed synthesis keeps the generated text.
    pub async fn generate_and_speak(&self, source: SourceChoice) -> Result<Settled<()>, ActionError> {
        match self.generate_with(source).await? {
            Settled::Applied(text) => self.speak_text(&text).await,
            Settled::Superseded => Ok(Settled::Superseded),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_session(&self.session)
    }

    /// Report a failed precondition.  Takes a ticket so that any older
    /// in-flight action cannot overwrite the message.
    fn reject(&self, st: &mut SessionState, err: ActionError) -> ActionError {
        let ticket = st.issue(&[]);
        log::debug!("controller: rejected #{}: {err}", ticket.value());
        st.report(ticket, OperationStatus::Failed(err.message().to_string()));
        err
    }

    fn fail(&self, st: &mut SessionState, ticket: Ticket, err: ActionError) -> ActionError {
        st.report(ticket, OperationStatus::Failed(err.message().to_string()));
        err
    }
}

fn too_short(st: &SessionState) -> Option<ActionError> {
    if st.params.has_enough_source() {
        None
    } else {
        Some(ActionError::Validation(format!(
            "Text is too short for model order {}. Add more text or lower the order.",
            st.params.order
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
