//! Line editor for the interactive session.
//!
//! `rustyline` blocks on the terminal, so the editor lives on its own
//! thread and forwards every line to the async session loop over an
//! [`mpsc`] channel.  Command words complete from [`HELP`](crate::app::HELP),
//! and `set` completes parameter names.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use crate::app::{command_names, parse_command, SessionCommand, PARAM_NAMES};

pub const PROMPT: &str = "verse> ";

/// What the editor thread saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplEvent {
    Line(String),
    /// Ctrl-C.  The session keeps running.
    Interrupted,
    /// Ctrl-D, or the terminal went away.
    Eof,
}

// ---------------------------------------------------------------------------
// CommandHelper
// ---------------------------------------------------------------------------

/// Completion and inline hints for session commands.
#[derive(Clone)]
pub struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    pub fn new() -> Self {
        Self {
            commands: command_names(),
        }
    }

    /// Start offset and candidates for the text left of the cursor.
    pub fn candidates(&self, line: &str) -> (usize, Vec<&'static str>) {
        let lower = line.to_ascii_lowercase();

        match lower.split_once(char::is_whitespace) {
            None => (
                0,
                self.commands
                    .iter()
                    .copied()
                    .filter(|c| c.starts_with(lower.as_str()))
                    .collect(),
            ),
            Some(("set", rest)) => {
                let word = rest.trim_start();
                if word.contains(char::is_whitespace) {
                    return (line.len(), Vec::new());
                }
                let start = lower.len() - word.len();
                (
                    start,
                    PARAM_NAMES
                        .iter()
                        .copied()
                        .filter(|p| p.starts_with(word))
                        .collect(),
                )
            }
            Some(_) => (line.len(), Vec::new()),
        }
    }
}

impl Default for CommandHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, names) = self.candidates(line);
        let typed = &line[start..];
        if typed.is_empty() {
            return None;
        }
        names
            .into_iter()
            .find(|name| name.len() > typed.len())
            .map(|name| name[typed.len()..].to_string())
    }
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

// ---------------------------------------------------------------------------
// Editor thread
// ---------------------------------------------------------------------------

/// Start the editor thread.  It stops after sending `quit`, on Ctrl-D, or
/// once the receiving side is dropped, and saves history to `history_file`
/// on the way out.
pub fn spawn_reader(
    history_file: Option<PathBuf>,
    tx: mpsc::Sender<ReplEvent>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("line-editor".into())
        .spawn(move || read_loop(history_file, tx))
}

fn read_loop(history_file: Option<PathBuf>, tx: mpsc::Sender<ReplEvent>) {
    let mut editor = match Editor::<CommandHelper, DefaultHistory>::new() {
        Ok(editor) => editor,
        Err(e) => {
            log::error!("repl: cannot open line editor: {e}");
            let _ = tx.blocking_send(ReplEvent::Eof);
            return;
        }
    };
    editor.set_helper(Some(CommandHelper::new()));

    if let Some(path) = &history_file {
        if let Err(e) = editor.load_history(path) {
            log::debug!("repl: no history loaded from {}: {e}", path.display());
        }
    }

    loop {
        let event = match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                ReplEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReplEvent::Interrupted,
            Err(ReadlineError::Eof) => ReplEvent::Eof,
            Err(e) => {
                log::error!("repl: read failed: {e}");
                ReplEvent::Eof
            }
        };

        let last = match &event {
            ReplEvent::Line(line) => matches!(parse_command(line), Ok(SessionCommand::Quit)),
            ReplEvent::Interrupted => false,
            ReplEvent::Eof => true,
        };
        if tx.blocking_send(event).is_err() || last {
            break;
        }
    }

    if let Some(path) = &history_file {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = editor.save_history(path) {
            log::warn!("repl: failed to save history to {}: {e}", path.display());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
