//! Line-oriented command surface for an interactive session.
//!
//! # Commands
//!
//! | Command | Effect |
//! |---------|--------|
//! | `set <param> <value>` | edit a parameter (`-` resets a knob) |
//! | `append <line>` | add a line to the source text |
//! | `refresh` | reload the corpus library |
//! | `save` | save the source text as a corpus |
//! | `generate [corpus]` | generate from raw text or the selected corpus |
//! | `speak [text]` | synthesize the given text, or the generated text |
//! | `generate-speak [corpus]` | generate, then speak the result |
//! | `select <id>` | select a corpus |
//! | `library` / `show` / `status` / `history` | inspect the session |
//! | `download [dir]` | write the current audio to disk |
//! | `help` / `quit` | |
//!
//! Action commands go through [`ActionDispatcher`], which refuses a new one
//! while another is outstanding; edits and inspection are always allowed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::api::CorpusId;
use crate::config::ParameterBounds;
use crate::controller::{lock_session, SessionController, Settled, SourceChoice};
use crate::session::{
    Flow, Genre, Mood, OperationStatus, ParseKnobError, PlaybackError, SessionParameters,
};

pub const HELP: &str = "\
commands:
  set <title|text|length|order|temperature|seed|genre|flow|bpm|mood|voice|lang|slow> <value>
  append <line>          add a line to the source text
  refresh                reload the corpus library
  save                   save the source text as a corpus
  generate [corpus]      generate from the source text or the selected corpus
  speak [text]           speak the given text, or the generated text
  generate-speak [corpus]
  select <id>            select a corpus
  library | show | status | history
  download [dir]         write the current audio to disk
  help | quit";

/// Parameter names accepted by `set`.
pub const PARAM_NAMES: &[&str] = &[
    "title",
    "text",
    "length",
    "order",
    "temperature",
    "seed",
    "genre",
    "flow",
    "bpm",
    "mood",
    "voice",
    "lang",
    "slow",
];

/// Command words listed in [`HELP`], in order.
///
/// Each help line names one command, or several separated by `|`.
pub fn command_names() -> Vec<&'static str> {
    HELP.lines()
        .skip(1)
        .flat_map(|line| {
            let mut words = line.split_whitespace();
            let mut names: Vec<&'static str> = words.next().into_iter().collect();
            let mut after_bar = false;
            for word in words {
                if after_bar {
                    names.push(word);
                }
                after_bar = word == "|";
            }
            names
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs a value")]
    MissingArgument(&'static str),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid value '{value}' for {param}")]
    InvalidValue { param: &'static str, value: String },

    #[error(transparent)]
    Knob(#[from] ParseKnobError),
}

// ---------------------------------------------------------------------------
// SessionCommand
// ---------------------------------------------------------------------------

/// A parameter edit.  `None` on a knob means "use the default".
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEdit {
    Title(String),
    Text(String),
    AppendLine(String),
    Length(u32),
    Order(u32),
    Temperature(f32),
    Seed(Option<String>),
    Genre(Option<Genre>),
    Flow(Option<Flow>),
    Bpm(Option<u16>),
    Mood(Option<Mood>),
    Voice(Option<String>),
    Language(Option<String>),
    Slow(Option<bool>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Edit(ParamEdit),
    Refresh,
    Save,
    Generate(SourceChoice),
    Speak(Option<String>),
    GenerateSpeak(SourceChoice),
    Select(CorpusId),
    Library,
    Show,
    Status,
    History,
    Download(Option<PathBuf>),
    Help,
    Quit,
}

impl SessionCommand {
    /// `true` for commands that dispatch a network request.
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            SessionCommand::Refresh
                | SessionCommand::Save
                | SessionCommand::Generate(_)
                | SessionCommand::Speak(_)
                | SessionCommand::GenerateSpeak(_)
        )
    }
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<SessionCommand, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    let (word, rest) = split_word(line);

    let cmd = match word.to_ascii_lowercase().as_str() {
        "set" => SessionCommand::Edit(parse_edit(rest)?),
        "append" => SessionCommand::Edit(ParamEdit::AppendLine(rest.to_string())),
        "refresh" => SessionCommand::Refresh,
        "save" => SessionCommand::Save,
        "generate" => SessionCommand::Generate(parse_source(rest)?),
        "generate-speak" => SessionCommand::GenerateSpeak(parse_source(rest)?),
        "speak" => SessionCommand::Speak(non_empty(rest)),
        "select" => SessionCommand::Select(CorpusId(
            non_empty(rest).ok_or(CommandError::MissingArgument("select"))?,
        )),
        "library" => SessionCommand::Library,
        "show" => SessionCommand::Show,
        "status" => SessionCommand::Status,
        "history" => SessionCommand::History,
        "download" => SessionCommand::Download(non_empty(rest).map(PathBuf::from)),
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(cmd)
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_source(rest: &str) -> Result<SourceChoice, CommandError> {
    match rest.to_ascii_lowercase().as_str() {
        "" | "text" => Ok(SourceChoice::RawText),
        "corpus" | "selected" => Ok(SourceChoice::SelectedCorpus),
        other => Err(CommandError::InvalidValue {
            param: "source",
            value: other.to_string(),
        }),
    }
}

/// `-` or `default` resets a knob.
fn knob(value: &str) -> Option<&str> {
    match value {
        "-" | "default" => None,
        v => Some(v),
    }
}

fn number<T: std::str::FromStr>(param: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidValue {
        param,
        value: value.to_string(),
    })
}

fn parse_edit(rest: &str) -> Result<ParamEdit, CommandError> {
    let (param, value) = split_word(rest);
    if param.is_empty() {
        return Err(CommandError::MissingArgument("set"));
    }
    let param = param.to_ascii_lowercase();

    // Text-like params accept an empty value (clears them).
    match param.as_str() {
        "title" => return Ok(ParamEdit::Title(value.to_string())),
        "text" => return Ok(ParamEdit::Text(value.to_string())),
        "seed" => return Ok(ParamEdit::Seed(non_empty(value))),
        _ => {}
    }

    if value.is_empty() {
        return Err(CommandError::MissingArgument("set"));
    }

    let edit = match param.as_str() {
        "length" => ParamEdit::Length(number("length", value)?),
        "order" => ParamEdit::Order(number("order", value)?),
        "temperature" | "temp" => ParamEdit::Temperature(number("temperature", value)?),
        "genre" => ParamEdit::Genre(knob(value).map(str::parse::<Genre>).transpose()?),
        "flow" => ParamEdit::Flow(knob(value).map(str::parse::<Flow>).transpose()?),
        "mood" => ParamEdit::Mood(knob(value).map(str::parse::<Mood>).transpose()?),
        "bpm" => ParamEdit::Bpm(knob(value).map(|v| number::<u16>("bpm", v)).transpose()?),
        "voice" => ParamEdit::Voice(knob(value).map(str::to_string)),
        "lang" | "language" => ParamEdit::Language(knob(value).map(str::to_string)),
        "slow" => ParamEdit::Slow(knob(value).map(parse_flag).transpose()?),
        other => return Err(CommandError::UnknownParameter(other.to_string())),
    };
    Ok(edit)
}

fn parse_flag(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::InvalidValue {
            param: "slow",
            value: value.to_string(),
        }),
    }
}

impl ParamEdit {
    /// Apply the edit, clamping numbers to the advisory bounds.  Returns a
    /// note when a value was adjusted.
    pub fn apply(self, params: &mut SessionParameters, bounds: &ParameterBounds) -> Option<String> {
        match self {
            ParamEdit::Title(v) => params.title = v,
            ParamEdit::Text(v) => params.source_text = v,
            ParamEdit::AppendLine(line) => {
                if !params.source_text.is_empty() {
                    params.source_text.push('\n');
                }
                params.source_text.push_str(&line);
            }
            ParamEdit::Length(v) => {
                params.length = bounds.clamp_length(v);
                return (params.length != v).then(|| format!("length clamped to {}", params.length));
            }
            ParamEdit::Order(v) => {
                params.order = bounds.clamp_order(v);
                return (params.order != v).then(|| format!("order clamped to {}", params.order));
            }
            ParamEdit::Temperature(v) => {
                params.temperature = bounds.clamp_temperature(v);
                return (params.temperature != v)
                    .then(|| format!("temperature clamped to {}", params.temperature));
            }
            ParamEdit::Seed(v) => params.seed = v,
            ParamEdit::Genre(v) => params.style.genre = v,
            ParamEdit::Flow(v) => params.style.flow = v,
            ParamEdit::Bpm(v) => params.style.bpm = v,
            ParamEdit::Mood(v) => params.style.mood = v,
            ParamEdit::Voice(v) => params.style.voice = v,
            ParamEdit::Language(v) => params.style.language = v,
            ParamEdit::Slow(v) => params.style.slow = v,
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run a non-action command and return what to print.
pub fn execute_local(controller: &SessionController, cmd: SessionCommand) -> String {
    match cmd {
        SessionCommand::Edit(edit) => {
            let bounds = controller.config().generation.bounds.clone();
            controller
                .with_params(|p| edit.apply(p, &bounds))
                .unwrap_or_else(|| "ok".to_string())
        }
        SessionCommand::Select(id) => {
            let known = lock_session(&controller.session()).library.get(&id).is_some();
            let note = if known { "" } else { " (not in the cached library)" };
            let out = format!("selected {id}{note}");
            controller.select_corpus(id);
            out
        }
        SessionCommand::Library => render_library(controller),
        SessionCommand::Show => render_session(controller),
        SessionCommand::Status => controller.status().to_string(),
        SessionCommand::History => {
            let session = controller.session();
            let st = lock_session(&session);
            st.status
                .history()
                .map(|e| format!("{} {}", e.at.format("%H:%M:%S"), e.status))
                .collect::<Vec<_>>()
                .join("\n")
        }
        SessionCommand::Download(dir) => download(controller, dir),
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => String::new(),
        action => format!("'{action:?}' is an action; dispatch it with run_action"),
    }
}

/// Run an action command to completion and return what to print.
pub async fn run_action(controller: &SessionController, cmd: SessionCommand) -> String {
    let outcome = match cmd {
        SessionCommand::Refresh => controller.refresh_library().await.map(|_| ()),
        SessionCommand::Save => controller.save_corpus().await.map(|_| ()),
        SessionCommand::Generate(source) => match controller.generate_with(source).await {
            Ok(Settled::Applied(text)) => return format!("{}\n\n{text}", controller.status()),
            other => other.map(|_| ()),
        },
        SessionCommand::Speak(Some(text)) => controller.speak_text(&text).await.map(|_| ()),
        SessionCommand::Speak(None) => controller.speak_output().await.map(|_| ()),
        SessionCommand::GenerateSpeak(source) => {
            let out = controller.generate_and_speak(source).await.map(|_| ());
            if out.is_ok() {
                return format!("{}\n\n{}", controller.status(), controller.generated_text());
            }
            out
        }
        other => return execute_local(controller, other),
    };
    if let Err(e) = &outcome {
        log::debug!("action ended with {e:?}");
    }
    controller.status().to_string()
}

// ---------------------------------------------------------------------------
// ActionDispatcher
// ---------------------------------------------------------------------------

/// Spawns action commands and refuses a new one while another is
/// outstanding.
///
/// The outstanding flag is claimed before the task is spawned, so two
/// triggers read back-to-back cannot both get through even when the first
/// task has not been polled yet.
pub struct ActionDispatcher {
    controller: Arc<SessionController>,
    outstanding: Arc<AtomicBool>,
}

/// Releases the outstanding flag when the action task ends.
struct OutstandingGuard(Arc<AtomicBool>);

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ActionDispatcher {
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self {
            controller,
            outstanding: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// `true` while a dispatched action has not finished.
    pub fn is_outstanding(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Spawn `cmd` on the runtime.  The task resolves to the text to print.
    ///
    /// Refused with the current status while another action is outstanding.
    pub async fn dispatch(
        &self,
        cmd: SessionCommand,
    ) -> Result<JoinHandle<String>, OperationStatus> {
        if self.controller.is_busy()
            || self
                .outstanding
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
        {
            return Err(self.controller.status());
        }

        let guard = OutstandingGuard(Arc::clone(&self.outstanding));
        let controller = Arc::clone(&self.controller);
        let task = tokio::spawn(async move {
            let _guard = guard;
            run_action(&controller, cmd).await
        });

        // One poll is enough for the action to report Busy.
        tokio::task::yield_now().await;
        Ok(task)
    }
}

fn render_library(controller: &SessionController) -> String {
    let session = controller.session();
    let st = lock_session(&session);
    if st.library.is_empty() {
        return "no corpora".to_string();
    }
    let selected = st.library.selected();
    st.library
        .records()
        .iter()
        .map(|r| {
            let mark = if Some(&r.id) == selected { '*' } else { ' ' };
            format!(
                "{mark} {}  {}  ({})",
                r.id,
                r.title,
                r.created_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_session(controller: &SessionController) -> String {
    let session = controller.session();
    let st = lock_session(&session);
    let p = &st.params;
    let style = p.style.resolve_style(&controller.config().style);
    let voice = p.style.resolve_voice(&controller.config().speech);

    let mut out = format!(
        "title: {}\nlength: {}  order: {}  temperature: {}\nseed: {}\n\
         genre: {}  flow: {}  bpm: {}  mood: {}\nvoice: {}  lang: {}  slow: {}\n\
         selected: {}\nstatus: {}\n",
        p.effective_title(),
        p.length,
        p.order,
        p.temperature,
        p.effective_seed().unwrap_or_else(|| "-".into()),
        style.genre,
        style.flow,
        style.bpm,
        style.mood,
        voice.voice,
        voice.language,
        voice.slow,
        st.library
            .selected()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".into()),
        st.status.current(),
    );
    out.push_str(&format!("\n--- source ---\n{}\n", p.source_text));
    if !st.generated_text.is_empty() {
        out.push_str(&format!("\n--- generated ---\n{}\n", st.generated_text));
    }
    if let Some(audio) = st.playback.current() {
        out.push_str(&format!("\naudio: {} bytes ({})\n", audio.len(), audio.mime_type()));
    }
    out
}

fn download(controller: &SessionController, dir: Option<PathBuf>) -> String {
    let dir = dir.unwrap_or_else(|| controller.config().output.download_dir.clone());
    let stem = format!("verse-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S"));

    // Copy the artifact out so the file write happens without the lock.
    let artifact = lock_session(&controller.session()).playback.current().cloned();
    let Some(artifact) = artifact else {
        return PlaybackError::NothingToDownload.to_string();
    };
    match artifact.write_to(&dir, &stem) {
        Ok(path) => format!("saved {}", path.display()),
        Err(e) => e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tempfile::tempdir;
    use tokio::sync::Notify;

    use crate::api::{
        ApiError, CorpusRecord, CreateCorpusRequest, GenerateRequest, GenerateResponse,
        SpeechRequest, SpeechResponse, StudioService,
    };
    use crate::config::AppConfig;
    use crate::controller::new_shared_session;
    use crate::session::AudioArtifact;

    /// Service that is never reachable.
    struct Offline;

    #[async_trait]
    impl StudioService for Offline {
        async fn list_corpora(&self) -> Result<Vec<CorpusRecord>, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
        async fn create_corpus(&self, _r: CreateCorpusRequest) -> Result<CorpusRecord, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
        async fn generate(&self, _r: GenerateRequest) -> Result<GenerateResponse, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
        async fn synthesize(&self, _r: SpeechRequest) -> Result<SpeechResponse, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
    }

    /// Generation waits until the test releases it; listings are empty.
    #[derive(Default)]
    struct Held {
        release: Notify,
        generate_calls: AtomicUsize,
    }

    #[async_trait]
    impl StudioService for Held {
        async fn list_corpora(&self) -> Result<Vec<CorpusRecord>, ApiError> {
            Ok(Vec::new())
        }
        async fn create_corpus(&self, _r: CreateCorpusRequest) -> Result<CorpusRecord, ApiError> {
            Err(ApiError::Transport("read-only".into()))
        }
        async fn generate(&self, _r: GenerateRequest) -> Result<GenerateResponse, ApiError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(GenerateResponse {
                text: "held verse".into(),
            })
        }
        async fn synthesize(&self, _r: SpeechRequest) -> Result<SpeechResponse, ApiError> {
            Err(ApiError::Transport("read-only".into()))
        }
    }

    fn make_controller() -> SessionController {
        let config = AppConfig::default();
        SessionController::new(new_shared_session(&config), Arc::new(Offline), config)
    }

    // ---- parsing ---

    #[test]
    fn parses_actions() {
        assert_eq!(parse_command("save"), Ok(SessionCommand::Save));
        assert_eq!(
            parse_command("generate"),
            Ok(SessionCommand::Generate(SourceChoice::RawText))
        );
        assert_eq!(
            parse_command("Generate corpus"),
            Ok(SessionCommand::Generate(SourceChoice::SelectedCorpus))
        );
        assert_eq!(
            parse_command("generate-speak"),
            Ok(SessionCommand::GenerateSpeak(SourceChoice::RawText))
        );
        assert_eq!(parse_command("speak"), Ok(SessionCommand::Speak(None)));
        assert_eq!(
            parse_command("speak hello there"),
            Ok(SessionCommand::Speak(Some("hello there".into())))
        );
    }

    #[test]
    fn parses_edits() {
        assert_eq!(
            parse_command("set order 3"),
            Ok(SessionCommand::Edit(ParamEdit::Order(3)))
        );
        assert_eq!(
            parse_command("set title Summer Rain"),
            Ok(SessionCommand::Edit(ParamEdit::Title("Summer Rain".into())))
        );
        assert_eq!(
            parse_command("set genre hiphop"),
            Ok(SessionCommand::Edit(ParamEdit::Genre(Some(Genre::HipHop))))
        );
        assert_eq!(
            parse_command("set mood -"),
            Ok(SessionCommand::Edit(ParamEdit::Mood(None)))
        );
        assert_eq!(
            parse_command("set slow on"),
            Ok(SessionCommand::Edit(ParamEdit::Slow(Some(true))))
        );
        assert_eq!(
            parse_command("set seed"),
            Ok(SessionCommand::Edit(ParamEdit::Seed(None)))
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
        assert_eq!(
            parse_command("select"),
            Err(CommandError::MissingArgument("select"))
        );
        assert_eq!(
            parse_command("set order many"),
            Err(CommandError::InvalidValue {
                param: "order",
                value: "many".into()
            })
        );
        assert!(matches!(
            parse_command("set genre polka"),
            Err(CommandError::Knob(_))
        ));
        assert_eq!(
            parse_command("set colour red"),
            Err(CommandError::UnknownParameter("colour".into()))
        );
    }

    #[test]
    fn command_names_come_from_help() {
        let names = command_names();
        for expected in ["set", "append", "generate-speak", "library", "history", "download", "quit"] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert!(!names.contains(&"|"));
        for name in names.iter().filter(|n| **n != "set" && **n != "select") {
            assert!(parse_command(name).is_ok(), "'{name}' does not parse");
        }
    }

    #[test]
    fn every_listed_param_is_settable() {
        for param in PARAM_NAMES {
            let parsed = parse_command(&format!("set {param} 2"));
            assert!(
                !matches!(parsed, Err(CommandError::UnknownParameter(_))),
                "'{param}' is not a parameter"
            );
        }
    }

    #[test]
    fn only_network_commands_are_actions() {
        assert!(SessionCommand::Save.is_action());
        assert!(SessionCommand::Speak(None).is_action());
        assert!(!SessionCommand::Edit(ParamEdit::Order(2)).is_action());
        assert!(!SessionCommand::Select(CorpusId::from("x")).is_action());
        assert!(!SessionCommand::Status.is_action());
    }

    // ---- edits ---

    #[test]
    fn append_joins_lines() {
        let mut params = SessionParameters::default();
        let bounds = ParameterBounds::default();
        ParamEdit::AppendLine("first line".into()).apply(&mut params, &bounds);
        ParamEdit::AppendLine("second line".into()).apply(&mut params, &bounds);

        assert_eq!(params.source_text, "first line\nsecond line");
    }

    #[test]
    fn numeric_edits_are_clamped_with_note() {
        let mut params = SessionParameters::default();
        let bounds = ParameterBounds::default();

        let note = ParamEdit::Order(99).apply(&mut params, &bounds);
        assert_eq!(params.order, bounds.max_order);
        assert!(note.unwrap().contains("clamped"));

        assert_eq!(ParamEdit::Length(300).apply(&mut params, &bounds), None);
        assert_eq!(params.length, 300);
    }

    // ---- execution ---

    #[test]
    fn select_unknown_corpus_is_allowed_with_note() {
        let controller = make_controller();
        let out = execute_local(&controller, SessionCommand::Select(CorpusId::from("ghost")));

        assert!(out.contains("not in the cached library"));
        let session = controller.session();
        assert_eq!(
            lock_session(&session).library.selected(),
            Some(&CorpusId::from("ghost"))
        );
    }

    #[test]
    fn download_writes_current_audio() {
        let dir = tempdir().expect("temp dir");
        let controller = make_controller();
        lock_session(&controller.session())
            .playback
            .replace(AudioArtifact::new(b"ID3".to_vec(), "audio/mpeg"));

        let out = execute_local(
            &controller,
            SessionCommand::Download(Some(dir.path().to_path_buf())),
        );

        assert!(out.starts_with("saved "));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn download_without_audio_says_so() {
        let dir = tempdir().expect("temp dir");
        let controller = make_controller();

        let out = execute_local(
            &controller,
            SessionCommand::Download(Some(dir.path().to_path_buf())),
        );

        assert_eq!(out, "no audio to download");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn show_includes_generated_text() {
        let controller = make_controller();
        lock_session(&controller.session()).generated_text = "a new verse".into();

        let out = execute_local(&controller, SessionCommand::Show);
        assert!(out.contains("--- generated ---"));
        assert!(out.contains("a new verse"));
    }

    #[tokio::test]
    async fn offline_refresh_reports_store_unavailable() {
        let controller = make_controller();
        let out = run_action(&controller, SessionCommand::Refresh).await;

        assert!(out.starts_with("Error:"));
        assert!(out.contains("may be unavailable"));
    }

    #[tokio::test]
    async fn validation_failure_is_printed_as_status() {
        let controller = make_controller();
        let out = run_action(&controller, SessionCommand::Generate(SourceChoice::SelectedCorpus))
            .await;

        assert_eq!(out, "Error: Pick a corpus first.");
    }

    #[tokio::test]
    async fn second_action_is_refused_while_first_is_outstanding() {
        let config = AppConfig::default();
        let service = Arc::new(Held::default());
        let controller = Arc::new(SessionController::new(
            new_shared_session(&config),
            Arc::clone(&service) as Arc<dyn StudioService>,
            config,
        ));
        controller.with_params(|p| p.source_text = "enough source text".into());
        let dispatcher = ActionDispatcher::new(Arc::clone(&controller));

        let first = dispatcher
            .dispatch(SessionCommand::Generate(SourceChoice::RawText))
            .await
            .expect("first trigger accepted");
        assert!(controller.is_busy());
        assert!(dispatcher.is_outstanding());

        let second = dispatcher
            .dispatch(SessionCommand::Generate(SourceChoice::RawText))
            .await;
        assert_eq!(
            second.unwrap_err(),
            OperationStatus::Busy("Generating…".into())
        );
        assert_eq!(service.generate_calls.load(Ordering::SeqCst), 1);

        service.release.notify_one();
        let out = first.await.expect("action task");
        assert!(out.contains("held verse"));
        assert!(!dispatcher.is_outstanding());

        let refresh = dispatcher
            .dispatch(SessionCommand::Refresh)
            .await
            .expect("accepted once idle");
        assert_eq!(refresh.await.expect("action task"), "Done: Loaded 0 corpora.");
    }
}
