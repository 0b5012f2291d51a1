//! Decoded key presses and the binding tables.
//!
//! The command keymap resolves multi-key sequences (`:n`, `ZZ`, `ESC n`)
//! incrementally: a sequence that is a strict prefix of some binding stays
//! pending and is echoed in the status row until it resolves or fails. A
//! separate, flat keymap drives the line editor used by pattern entry and
//! the "Examine:" prompt.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A decoded terminal key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPress {
    Char(char),
    Ctrl(char),
    Alt(char),
    Enter,
    Backspace,
    Delete,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl KeyPress {
    /// Decode a crossterm key event; repeats and releases are dropped.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        let key = match event.code {
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyPress::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::ALT) => KeyPress::Alt(c),
            KeyCode::Char(c) => KeyPress::Char(c),
            KeyCode::Enter => KeyPress::Enter,
            KeyCode::Backspace => KeyPress::Backspace,
            KeyCode::Delete => KeyPress::Delete,
            KeyCode::Esc => KeyPress::Esc,
            KeyCode::Up => KeyPress::Up,
            KeyCode::Down => KeyPress::Down,
            KeyCode::Left => KeyPress::Left,
            KeyCode::Right => KeyPress::Right,
            KeyCode::Home => KeyPress::Home,
            KeyCode::End => KeyPress::End,
            KeyCode::PageUp => KeyPress::PageUp,
            KeyCode::PageDown => KeyPress::PageDown,
            _ => return None,
        };
        Some(key)
    }

    /// Status-row rendering of a key, `less`-style.
    pub fn printable(self) -> String {
        match self {
            KeyPress::Char(c) => c.to_string(),
            KeyPress::Ctrl(c) => format!("^{}", c.to_ascii_uppercase()),
            KeyPress::Alt(c) => format!("ESC {c}"),
            KeyPress::Esc => "ESC".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// Everything the command keymap can ask the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Help,
    Exit,
    ForwardOneLine,
    BackwardOneLine,
    ForwardOneWindowOrLines,
    BackwardOneWindowOrLines,
    ForwardOneWindowAndSet,
    BackwardOneWindowAndSet,
    ForwardOneWindowNoStop,
    ForwardHalfWindowAndSet,
    BackwardHalfWindowAndSet,
    LeftOneHalfScreen,
    RightOneHalfScreen,
    Repaint,
    RepaintAndDiscard,
    RepeatSearchForward,
    RepeatSearchBackward,
    RepeatSearchForwardSpanFiles,
    RepeatSearchBackwardSpanFiles,
    UndoSearch,
    GoToFirstLineOrN,
    GoToLastLineOrN,
    Home,
    End,
    AddFile,
    NextFile,
    PrevFile,
    GoToFile,
    InfoFile,
    DeleteFile,
}

/// Outcome of resolving a (possibly partial) key sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Op(Operation),
    /// Strict prefix of at least one binding; keep collecting.
    Prefix,
    Unbound,
}

use KeyPress::*;
use Operation as Op;

const BINDINGS: &[(&[KeyPress], Operation)] = &[
    (&[Char('h')], Op::Help),
    (&[Char('H')], Op::Help),
    (&[Char('q')], Op::Exit),
    (&[Char('Q')], Op::Exit),
    (&[Char(':'), Char('q')], Op::Exit),
    (&[Char(':'), Char('Q')], Op::Exit),
    (&[Char('Z'), Char('Z')], Op::Exit),
    (&[Char('e')], Op::ForwardOneLine),
    (&[Ctrl('e')], Op::ForwardOneLine),
    (&[Char('j')], Op::ForwardOneLine),
    (&[Ctrl('n')], Op::ForwardOneLine),
    (&[Enter], Op::ForwardOneLine),
    (&[Down], Op::ForwardOneLine),
    (&[Char('y')], Op::BackwardOneLine),
    (&[Ctrl('y')], Op::BackwardOneLine),
    (&[Char('k')], Op::BackwardOneLine),
    (&[Ctrl('k')], Op::BackwardOneLine),
    (&[Ctrl('p')], Op::BackwardOneLine),
    (&[Up], Op::BackwardOneLine),
    (&[Char('f')], Op::ForwardOneWindowOrLines),
    (&[Ctrl('f')], Op::ForwardOneWindowOrLines),
    (&[Ctrl('v')], Op::ForwardOneWindowOrLines),
    (&[Char(' ')], Op::ForwardOneWindowOrLines),
    (&[PageDown], Op::ForwardOneWindowOrLines),
    (&[Char('b')], Op::BackwardOneWindowOrLines),
    (&[Ctrl('b')], Op::BackwardOneWindowOrLines),
    (&[PageUp], Op::BackwardOneWindowOrLines),
    (&[Char('z')], Op::ForwardOneWindowAndSet),
    (&[Char('w')], Op::BackwardOneWindowAndSet),
    (&[Esc, Char(' ')], Op::ForwardOneWindowNoStop),
    (&[Char('d')], Op::ForwardHalfWindowAndSet),
    (&[Ctrl('d')], Op::ForwardHalfWindowAndSet),
    (&[Char('u')], Op::BackwardHalfWindowAndSet),
    (&[Ctrl('u')], Op::BackwardHalfWindowAndSet),
    (&[Right], Op::RightOneHalfScreen),
    (&[Left], Op::LeftOneHalfScreen),
    (&[Char('r')], Op::Repaint),
    (&[Ctrl('r')], Op::Repaint),
    (&[Ctrl('l')], Op::Repaint),
    (&[Char('R')], Op::RepaintAndDiscard),
    (&[Char('n')], Op::RepeatSearchForward),
    (&[Char('N')], Op::RepeatSearchBackward),
    (&[Esc, Char('n')], Op::RepeatSearchForwardSpanFiles),
    (&[Esc, Char('N')], Op::RepeatSearchBackwardSpanFiles),
    (&[Esc, Char('u')], Op::UndoSearch),
    (&[Char('g')], Op::GoToFirstLineOrN),
    (&[Char('<')], Op::GoToFirstLineOrN),
    (&[Char('G')], Op::GoToLastLineOrN),
    (&[Char('>')], Op::GoToLastLineOrN),
    (&[Home], Op::Home),
    (&[End], Op::End),
    (&[Char(':'), Char('e')], Op::AddFile),
    (&[Char(':'), Char('n')], Op::NextFile),
    (&[Char(':'), Char('p')], Op::PrevFile),
    (&[Char(':'), Char('x')], Op::GoToFile),
    (&[Char('=')], Op::InfoFile),
    (&[Char(':'), Char('f')], Op::InfoFile),
    (&[Ctrl('g')], Op::InfoFile),
    (&[Char(':'), Char('d')], Op::DeleteFile),
];

/// Resolve a collected key sequence against the command bindings.
pub fn resolve(seq: &[KeyPress]) -> Resolution {
    let mut is_prefix = false;
    for (binding, op) in BINDINGS {
        if *binding == seq {
            return Resolution::Op(*op);
        }
        if binding.len() > seq.len() && binding.starts_with(seq) {
            is_prefix = true;
        }
    }
    if is_prefix {
        Resolution::Prefix
    } else {
        Resolution::Unbound
    }
}

/// Line-editing operations shared by pattern entry and the file prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    Backspace,
    Delete,
    DeleteWord,
    DeleteLine,
    Left,
    Right,
    Home,
    End,
    NextWord,
    PrevWord,
    HistoryUp,
    HistoryDown,
    Accept,
    Cancel,
}

/// Map a key press onto a line-editing operation.
pub fn edit_op(key: KeyPress) -> Option<EditOp> {
    let op = match key {
        Char(c) => EditOp::Insert(c),
        Enter => EditOp::Accept,
        Esc => EditOp::Cancel,
        Backspace => EditOp::Backspace,
        Delete | Alt('x') => EditOp::Delete,
        Alt('X') => EditOp::DeleteWord,
        Ctrl('u') => EditOp::DeleteLine,
        Left | Alt('h') => EditOp::Left,
        Right | Alt('l') => EditOp::Right,
        Home | Alt('0') => EditOp::Home,
        End | Alt('$') => EditOp::End,
        Alt('w') => EditOp::NextWord,
        Alt('b') => EditOp::PrevWord,
        Up | Alt('k') => EditOp::HistoryUp,
        Down | Alt('j') => EditOp::HistoryDown,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_bindings_resolve_directly() {
        assert_eq!(resolve(&[Char('j')]), Resolution::Op(Op::ForwardOneLine));
        assert_eq!(resolve(&[Char('q')]), Resolution::Op(Op::Exit));
        assert_eq!(resolve(&[Char('G')]), Resolution::Op(Op::GoToLastLineOrN));
    }

    #[test]
    fn colon_and_z_sequences_stay_pending_then_resolve() {
        assert_eq!(resolve(&[Char(':')]), Resolution::Prefix);
        assert_eq!(
            resolve(&[Char(':'), Char('n')]),
            Resolution::Op(Op::NextFile)
        );
        assert_eq!(resolve(&[Char('Z')]), Resolution::Prefix);
        assert_eq!(resolve(&[Char('Z'), Char('Z')]), Resolution::Op(Op::Exit));
    }

    #[test]
    fn escape_sequences_resolve_the_span_search_aliases() {
        assert_eq!(resolve(&[Esc]), Resolution::Prefix);
        assert_eq!(
            resolve(&[Esc, Char('n')]),
            Resolution::Op(Op::RepeatSearchForwardSpanFiles)
        );
        assert_eq!(resolve(&[Esc, Char('u')]), Resolution::Op(Op::UndoSearch));
    }

    #[test]
    fn unbound_sequences_fail() {
        assert_eq!(resolve(&[Char(':'), Char('z')]), Resolution::Unbound);
        assert_eq!(resolve(&[Char('Z'), Char('q')]), Resolution::Unbound);
        assert_eq!(resolve(&[Ctrl('q')]), Resolution::Unbound);
    }

    #[test]
    fn key_decoding_handles_modifiers_and_releases() {
        let press = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(KeyPress::from_event(press), Some(Char('j')));

        let ctrl = KeyEvent::new(KeyCode::Char('D'), KeyModifiers::CONTROL);
        assert_eq!(KeyPress::from_event(ctrl), Some(Ctrl('d')));

        let mut release = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(KeyPress::from_event(release), None);
    }

    #[test]
    fn printable_renders_control_and_escape_keys() {
        assert_eq!(Char(':').printable(), ":");
        assert_eq!(Ctrl('g').printable(), "^G");
        assert_eq!(Esc.printable(), "ESC");
    }
}
