//! The command/option/pattern input state machine.
//!
//! A tagged mode decides how each key press is consumed. Command mode
//! accumulates a numeric prefix and resolves multi-key bindings; typing `-`
//! switches to option entry, and `/`, `?`, `&` open a pattern prompt backed
//! by the line editor. The interpreter owns all buffered text; the session
//! only sees resolved [`Action`]s.

use crate::input::editor::{EditStatus, LineEditor};
use crate::input::keys::{self, EditOp, KeyPress, Operation, Resolution};

/// Which pattern prompt is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    SearchForward,
    SearchBackward,
    Filter,
}

impl PatternKind {
    pub fn prompt(self) -> char {
        match self {
            PatternKind::SearchForward => '/',
            PatternKind::SearchBackward => '?',
            PatternKind::Filter => '&',
        }
    }
}

/// In-session option toggles reachable through `-` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    QuitAtSecondEof,
    QuitAtFirstEof,
    PrintLines,
    Quiet,
    VeryQuiet,
    ChopLongLines,
    IgnoreCaseCond,
    IgnoreCaseAlways,
}

const OPTIONS: &[(&str, OptionKind)] = &[
    ("-e", OptionKind::QuitAtSecondEof),
    ("--quit-at-eof", OptionKind::QuitAtSecondEof),
    ("-E", OptionKind::QuitAtFirstEof),
    ("--QUIT-AT-EOF", OptionKind::QuitAtFirstEof),
    ("-N", OptionKind::PrintLines),
    ("--LINE-NUMBERS", OptionKind::PrintLines),
    ("-q", OptionKind::Quiet),
    ("--quiet", OptionKind::Quiet),
    ("--silent", OptionKind::Quiet),
    ("-Q", OptionKind::VeryQuiet),
    ("--QUIET", OptionKind::VeryQuiet),
    ("--SILENT", OptionKind::VeryQuiet),
    ("-S", OptionKind::ChopLongLines),
    ("--chop-long-lines", OptionKind::ChopLongLines),
    ("-i", OptionKind::IgnoreCaseCond),
    ("--ignore-case", OptionKind::IgnoreCaseCond),
    ("-I", OptionKind::IgnoreCaseAlways),
    ("--IGNORE-CASE", OptionKind::IgnoreCaseAlways),
];

fn lookup_exact(name: &str) -> Option<OptionKind> {
    OPTIONS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, kind)| *kind)
}

/// Current input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    OptionEntry,
    PatternEntry { kind: PatternKind },
    AddFile,
    /// An error message is on screen; the next key press only acknowledges it.
    AwaitKeypress,
}

/// What a key press resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consumed with no visible effect.
    Noop,
    /// Buffered text or a pending sequence changed; repaint the status row.
    Redraw,
    Dispatch {
        op: Operation,
        /// Numeric prefix, already validated strictly positive.
        count: Option<usize>,
    },
    CommitPattern {
        kind: PatternKind,
        raw: String,
    },
    /// Browse the pattern history from an open pattern prompt.
    HistoryUp,
    HistoryDown,
    CommitOption(OptionKind),
    /// The "Examine:" prompt was accepted with this path or glob.
    AddSource(String),
    /// An entry mode was abandoned.
    Cancelled,
    /// The pending error message was acknowledged.
    Acknowledged,
    /// Show a transient message (option entry errors).
    Message(String),
}

#[derive(Debug, Default)]
pub struct Interpreter {
    mode: Option<ModeState>,
    count: String,
    option_buffer: String,
    editor: Option<LineEditor>,
    pending: Vec<KeyPress>,
}

// Internal mode representation; `Mode` is the public projection.
#[derive(Debug)]
enum ModeState {
    OptionEntry,
    PatternEntry(PatternKind),
    AddFile,
    AwaitKeypress,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        match self.mode {
            None => Mode::Command,
            Some(ModeState::OptionEntry) => Mode::OptionEntry,
            Some(ModeState::PatternEntry(kind)) => Mode::PatternEntry { kind },
            Some(ModeState::AddFile) => Mode::AddFile,
            Some(ModeState::AwaitKeypress) => Mode::AwaitKeypress,
        }
    }

    pub fn handle_key(&mut self, key: KeyPress) -> Action {
        match self.mode {
            None => self.handle_command_key(key),
            Some(ModeState::OptionEntry) => self.handle_option_key(key),
            Some(ModeState::PatternEntry(kind)) => self.handle_pattern_key(kind, key),
            Some(ModeState::AddFile) => self.handle_add_file_key(key),
            Some(ModeState::AwaitKeypress) => {
                self.reset_to_command();
                Action::Acknowledged
            }
        }
    }

    /// Open the "Examine:" prompt (dispatched from the `:e` binding).
    pub fn begin_add_file(&mut self) {
        self.editor = Some(LineEditor::new("Examine: "));
        self.mode = Some(ModeState::AddFile);
    }

    /// Swallow the next key press as an acknowledgement.
    pub fn await_keypress(&mut self) {
        self.reset_to_command();
        self.mode = Some(ModeState::AwaitKeypress);
    }

    /// Replace the open pattern prompt's body with a history entry.
    pub fn recall_pattern(&mut self, body: &str) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_body(body);
        }
    }

    /// Body of the open pattern prompt, if one is open.
    pub fn pattern_body(&self) -> Option<String> {
        match self.mode {
            Some(ModeState::PatternEntry(_)) => self.editor.as_ref().map(LineEditor::body),
            _ => None,
        }
    }

    /// Buffered text to echo in the status row.
    pub fn buffer_display(&self) -> Option<String> {
        match self.mode {
            None | Some(ModeState::AwaitKeypress) => {
                (!self.count.is_empty()).then(|| self.count.clone())
            }
            Some(ModeState::OptionEntry) => Some(self.option_buffer.clone()),
            Some(ModeState::PatternEntry(_)) | Some(ModeState::AddFile) => {
                self.editor.as_ref().map(LineEditor::display)
            }
        }
    }

    /// Cursor column in the status row while an editing prompt is open.
    pub fn cursor_column(&self) -> Option<usize> {
        match self.mode {
            Some(ModeState::PatternEntry(_)) | Some(ModeState::AddFile) => {
                self.editor.as_ref().map(LineEditor::cursor_column)
            }
            _ => None,
        }
    }

    /// Echo of an unresolved multi-key sequence.
    pub fn pending_display(&self) -> Option<String> {
        (!self.pending.is_empty()).then(|| {
            self.pending
                .iter()
                .map(|key| key.printable())
                .collect::<String>()
        })
    }

    fn handle_command_key(&mut self, key: KeyPress) -> Action {
        if self.pending.is_empty() {
            if let KeyPress::Char(c) = key {
                match c {
                    '-' => {
                        self.count.clear();
                        self.option_buffer = "-".to_string();
                        self.mode = Some(ModeState::OptionEntry);
                        return Action::Redraw;
                    }
                    '/' => return self.begin_pattern(PatternKind::SearchForward),
                    '?' => return self.begin_pattern(PatternKind::SearchBackward),
                    '&' => return self.begin_pattern(PatternKind::Filter),
                    '0'..='9' => {
                        self.count.push(c);
                        return Action::Redraw;
                    }
                    _ => {}
                }
            }
            if key == KeyPress::Backspace && !self.count.is_empty() {
                self.count.pop();
                return Action::Redraw;
            }
        }

        self.pending.push(key);
        match keys::resolve(&self.pending) {
            Resolution::Op(op) => {
                self.pending.clear();
                let count = self.take_count();
                Action::Dispatch { op, count }
            }
            Resolution::Prefix => Action::Redraw,
            Resolution::Unbound => {
                self.pending.clear();
                Action::Noop
            }
        }
    }

    fn begin_pattern(&mut self, kind: PatternKind) -> Action {
        self.count.clear();
        self.editor = Some(LineEditor::new(&kind.prompt().to_string()));
        self.mode = Some(ModeState::PatternEntry(kind));
        Action::Redraw
    }

    fn handle_option_key(&mut self, key: KeyPress) -> Action {
        match key {
            KeyPress::Enter => match lookup_exact(&self.option_buffer) {
                Some(kind) => {
                    self.reset_to_command();
                    Action::CommitOption(kind)
                }
                None => {
                    let message = format!("There is no {} option", self.option_buffer);
                    self.reset_to_command();
                    Action::Message(message)
                }
            },
            KeyPress::Backspace => {
                self.option_buffer.pop();
                if self.option_buffer.is_empty() {
                    self.reset_to_command();
                }
                Action::Redraw
            }
            KeyPress::Char(c) => {
                // A single non-dash character is a short option looked up
                // immediately; longer input prefix-matches the table with
                // autocompletion once it becomes unambiguous.
                if self.option_buffer == "-" {
                    self.option_buffer.push(c);
                    if c == '-' {
                        return Action::Redraw;
                    }
                    return match lookup_exact(&self.option_buffer) {
                        Some(kind) => {
                            self.reset_to_command();
                            Action::CommitOption(kind)
                        }
                        None => {
                            let message = format!("There is no {} option", self.option_buffer);
                            self.reset_to_command();
                            Action::Message(message)
                        }
                    };
                }
                self.option_buffer.push(c);
                let matching: Vec<&str> = OPTIONS
                    .iter()
                    .map(|(key, _)| *key)
                    .filter(|key| key.starts_with(&self.option_buffer))
                    .collect();
                match matching.len() {
                    0 => {
                        self.reset_to_command();
                        Action::Redraw
                    }
                    1 => {
                        self.option_buffer = matching[0].to_string();
                        Action::Redraw
                    }
                    _ => Action::Redraw,
                }
            }
            _ => Action::Noop,
        }
    }

    fn handle_pattern_key(&mut self, kind: PatternKind, key: KeyPress) -> Action {
        let Some(op) = keys::edit_op(key) else {
            return Action::Noop;
        };
        match op {
            EditOp::Accept => {
                let raw = self.editor.as_ref().map(LineEditor::body).unwrap_or_default();
                self.reset_to_command();
                Action::CommitPattern { kind, raw }
            }
            EditOp::Cancel => {
                self.reset_to_command();
                Action::Cancelled
            }
            EditOp::HistoryUp => Action::HistoryUp,
            EditOp::HistoryDown => Action::HistoryDown,
            other => self.apply_edit(other),
        }
    }

    fn handle_add_file_key(&mut self, key: KeyPress) -> Action {
        let Some(op) = keys::edit_op(key) else {
            return Action::Noop;
        };
        match op {
            EditOp::Accept => {
                let spec = self.editor.as_ref().map(LineEditor::body).unwrap_or_default();
                self.reset_to_command();
                if spec.is_empty() {
                    Action::Cancelled
                } else {
                    Action::AddSource(spec)
                }
            }
            EditOp::Cancel | EditOp::HistoryUp | EditOp::HistoryDown => {
                if op == EditOp::Cancel {
                    self.reset_to_command();
                    Action::Cancelled
                } else {
                    Action::Noop
                }
            }
            other => self.apply_edit(other),
        }
    }

    fn apply_edit(&mut self, op: EditOp) -> Action {
        let Some(editor) = self.editor.as_mut() else {
            return Action::Noop;
        };
        match editor.apply(op) {
            EditStatus::Cancelled => {
                self.reset_to_command();
                Action::Cancelled
            }
            EditStatus::Edited => Action::Redraw,
        }
    }

    fn take_count(&mut self) -> Option<usize> {
        let parsed = self.count.parse::<usize>().ok().filter(|n| *n > 0);
        self.count.clear();
        parsed
    }

    fn reset_to_command(&mut self) {
        self.mode = None;
        self.option_buffer.clear();
        self.editor = None;
    }
}
