//! Session state and operation dispatch.
//!
//! A [`PagerSession`] owns everything one interactive run needs: the source
//! registry, view position, flags, compiled patterns, history, and the input
//! interpreter. The application loop feeds it key presses; it answers with
//! updated state and composes frames on demand. All user-visible messages are
//! produced here so the composer stays a pure formatter.

use crate::error::{PagerError, Result};
use crate::input::{Action, Interpreter, KeyPress, Operation, OptionKind, PatternKind};
use crate::navigate::{self, MoveOutcome, Navigator};
use crate::render::{
    compose_content, compose_one_screen, compose_status, ContentInputs, Message, ScreenFrame,
    StatusInputs,
};
use crate::search::{BrowseOutcome, CasePolicy, PatternHistory, PatternState};
use crate::source::SourceRegistry;
use crate::text::StyledLine;
use crate::view::{Flags, Geometry, SavedPosition, ViewPosition};

pub struct PagerSession {
    registry: SourceRegistry,
    view: ViewPosition,
    geom: Geometry,
    flags: Flags,
    patterns: PatternState,
    history: PatternHistory,
    interpreter: Interpreter,
    message: Option<Message>,
    /// Lines moved by a window command; `z`/`w` update it.
    window: usize,
    /// Lines moved by a half-window command; `d`/`u` update it.
    half_window: usize,
    /// End-of-stream signals since the last successful open.
    nb_eof: u32,
    /// Direction of the last committed search; repeat commands key off it.
    search_forward: bool,
    /// Set while the help source is active; restored on exit.
    saved_before_help: Option<SavedPosition>,
    bell_pending: bool,
    clear_pending: bool,
    quit: bool,
}

impl PagerSession {
    pub fn new(mut registry: SourceRegistry, flags: Flags, geom: Geometry) -> Result<Self> {
        let opened = registry.open_active()?;
        let window = geom.rows.saturating_sub(1).max(1);
        let mut session = Self {
            registry,
            view: ViewPosition::default(),
            geom,
            flags,
            patterns: PatternState::with_policy(case_policy(&flags)),
            history: PatternHistory::new(),
            interpreter: Interpreter::new(),
            message: None,
            window,
            half_window: (window / 2).max(1),
            nb_eof: 0,
            search_forward: true,
            saved_before_help: None,
            bell_pending: false,
            clear_pending: false,
            quit: false,
        };
        session.after_open(opened);
        Ok(session)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn real_count(&self) -> usize {
        self.registry.real_count()
    }

    /// Ring the bell on the next paint?
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    /// Wipe the backing buffer before the next paint?
    pub fn take_clear(&mut self) -> bool {
        std::mem::take(&mut self.clear_pending)
    }

    pub fn resize(&mut self, geom: Geometry) {
        self.geom = geom;
        self.window = geom.rows.saturating_sub(1).max(1);
        self.half_window = (self.window / 2).max(1);
        self.clear_pending = true;
    }

    /// Feed one key press through the interpreter and apply the resulting
    /// action. The quit-at-eof policy is evaluated after every key, mirroring
    /// the command loop it models.
    pub fn handle_key(&mut self, key: KeyPress) -> Result<()> {
        let action = self.interpreter.handle_key(key);
        self.apply(action)?;
        self.check_quit_at_eof()
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Noop | Action::Redraw => Ok(()),
            Action::Cancelled | Action::Acknowledged => {
                self.message = None;
                Ok(())
            }
            Action::Message(text) => {
                self.error_message(text);
                Ok(())
            }
            Action::HistoryUp => {
                let current = self.interpreter.pattern_body().unwrap_or_default();
                if let Some(entry) = self.history.browse_up(&current) {
                    let entry = entry.to_string();
                    self.interpreter.recall_pattern(&entry);
                }
                Ok(())
            }
            Action::HistoryDown => {
                match self.history.browse_down() {
                    Some(BrowseOutcome::Entry(body)) | Some(BrowseOutcome::Restored(body)) => {
                        self.interpreter.recall_pattern(&body);
                    }
                    None => {}
                }
                Ok(())
            }
            Action::CommitOption(kind) => self.toggle_option(kind),
            Action::CommitPattern { kind, raw } => self.commit_pattern(kind, &raw),
            Action::AddSource(spec) => self.add_source(&spec),
            Action::Dispatch { op, count } => self.dispatch(op, count),
        }
    }

    fn dispatch(&mut self, op: Operation, count: Option<usize>) -> Result<()> {
        log::debug!("dispatch {op:?} count {count:?}");
        self.message = None;

        // The help source only answers window paging and exit; exit restores
        // the saved position instead of quitting.
        if self.registry.is_help_active() {
            return match op {
                Operation::ForwardOneWindowOrLines => {
                    self.move_forward(count.unwrap_or(self.window))
                }
                Operation::BackwardOneWindowOrLines => {
                    self.move_backward(count.unwrap_or(self.window))
                }
                Operation::Exit => self.leave_help(),
                _ => Ok(()),
            };
        }

        match op {
            Operation::Help => self.enter_help(),
            Operation::Exit => {
                self.quit = true;
                Ok(())
            }
            Operation::ForwardOneLine => self.move_forward(count.unwrap_or(1)),
            Operation::BackwardOneLine => self.move_backward(count.unwrap_or(1)),
            Operation::ForwardOneWindowOrLines => self.move_forward(count.unwrap_or(self.window)),
            Operation::BackwardOneWindowOrLines => self.move_backward(count.unwrap_or(self.window)),
            Operation::ForwardOneWindowAndSet => {
                if let Some(n) = count {
                    self.window = n;
                }
                self.move_forward(self.window)
            }
            Operation::BackwardOneWindowAndSet => {
                if let Some(n) = count {
                    self.window = n;
                }
                self.move_backward(self.window)
            }
            Operation::ForwardOneWindowNoStop => self.move_forward(self.window),
            Operation::ForwardHalfWindowAndSet => {
                if let Some(n) = count {
                    self.half_window = n;
                }
                self.move_forward(self.half_window)
            }
            Operation::BackwardHalfWindowAndSet => {
                if let Some(n) = count {
                    self.half_window = n;
                }
                self.move_backward(self.half_window)
            }
            Operation::LeftOneHalfScreen => {
                self.view.first_column_to_display = self
                    .view
                    .first_column_to_display
                    .saturating_sub(self.geom.columns / 2);
                Ok(())
            }
            Operation::RightOneHalfScreen => {
                self.view.first_column_to_display += self.geom.columns / 2;
                Ok(())
            }
            Operation::GoToFirstLineOrN => self.move_to(count.unwrap_or(1).saturating_sub(1)),
            Operation::GoToLastLineOrN => match count {
                Some(n) => self.move_to(n.saturating_sub(1)),
                None => self.move_forward(navigate::TO_END),
            },
            Operation::Home => self.move_to(0),
            Operation::End => self.move_forward(navigate::TO_END),
            Operation::RepeatSearchForward | Operation::RepeatSearchForwardSpanFiles => {
                if self.search_forward {
                    self.move_to_next_match()
                } else {
                    self.move_to_previous_match()
                }
            }
            Operation::RepeatSearchBackward | Operation::RepeatSearchBackwardSpanFiles => {
                if self.search_forward {
                    self.move_to_previous_match()
                } else {
                    self.move_to_next_match()
                }
            }
            Operation::UndoSearch => {
                self.patterns.clear_search();
                Ok(())
            }
            Operation::Repaint => {
                self.clear_pending = true;
                Ok(())
            }
            Operation::RepaintAndDiscard => {
                self.clear_pending = true;
                Ok(())
            }
            Operation::AddFile => {
                self.interpreter.begin_add_file();
                Ok(())
            }
            Operation::NextFile => self.next_file(count.unwrap_or(1)),
            Operation::PrevFile => self.prev_file(count.unwrap_or(1)),
            Operation::GoToFile => self.goto_file(count.unwrap_or(1)),
            Operation::InfoFile => {
                self.message = Some(Message::FileInfo);
                Ok(())
            }
            Operation::DeleteFile => self.delete_file(),
        }
    }

    // -- movement ---------------------------------------------------------

    fn with_navigator<T>(
        &mut self,
        f: impl FnOnce(&mut Navigator<'_>) -> Result<T>,
    ) -> Result<Option<T>> {
        let is_help = self.registry.is_help_active();
        let total_lines = self.registry.active_total_lines();
        let geom = self.geom;
        let line_numbers = self.flags.print_line_numbers;
        let chop = self.flags.chop_long_lines;
        let patterns = &self.patterns;
        let view = &mut self.view;
        let Some(cache) = self.registry.cache_mut() else {
            return Ok(None);
        };
        let mut nav = Navigator {
            cache,
            filter: patterns.filter(),
            search: patterns.search(),
            is_help,
            total_lines,
            view,
            geom,
            line_numbers,
            chop,
        };
        f(&mut nav).map(Some)
    }

    fn move_forward(&mut self, count: usize) -> Result<()> {
        let outcome = self.with_navigator(|nav| nav.move_forward(count))?;
        self.settle(outcome);
        Ok(())
    }

    fn move_backward(&mut self, count: usize) -> Result<()> {
        let outcome = self.with_navigator(|nav| nav.move_backward(count))?;
        self.settle(outcome);
        Ok(())
    }

    fn move_to(&mut self, line: usize) -> Result<()> {
        // A seek before the retained region forces a reopen from the start.
        if self.view.first_line_in_memory > line {
            let opened = self.registry.open_active()?;
            self.after_open(opened);
            self.message = None;
        }
        let outcome = self.with_navigator(|nav| nav.move_to(line))?;
        self.settle(outcome);
        Ok(())
    }

    fn move_to_next_match(&mut self) -> Result<()> {
        if self.patterns.search().is_none() {
            self.error_message("Pattern not found".to_string());
            return Ok(());
        }
        let outcome = self.with_navigator(|nav| nav.move_to_next_match())?;
        self.settle(outcome);
        Ok(())
    }

    fn move_to_previous_match(&mut self) -> Result<()> {
        if self.patterns.search().is_none() {
            self.error_message("Pattern not found".to_string());
            return Ok(());
        }
        let outcome = self.with_navigator(|nav| nav.move_to_previous_match())?;
        self.settle(outcome);
        Ok(())
    }

    fn settle(&mut self, outcome: Option<MoveOutcome>) {
        match outcome {
            Some(MoveOutcome::EndOfStream) => self.signal_eof(),
            Some(MoveOutcome::BeginOfStream) => self.signal_bof(),
            Some(MoveOutcome::PatternNotFound) => {
                self.error_message("Pattern not found".to_string());
            }
            Some(MoveOutcome::Unreachable(line)) => {
                self.error_message(format!("Cannot seek to line number {}", line + 1));
            }
            Some(MoveOutcome::Moved) | None => {}
        }
    }

    fn signal_eof(&mut self) {
        self.nb_eof += 1;
        let idx = self.registry.index();
        let text = if idx > 0 && idx + 1 < self.registry.source_count() {
            let next = self.registry.name_at(idx + 1).unwrap_or_default();
            format!("(END) - Next: {next}")
        } else {
            "(END)".to_string()
        };
        self.message = Some(Message::Text(text));
        if !self.flags.quiet
            && !self.flags.very_quiet
            && !self.flags.quit_at_first_eof
            && !self.flags.quit_at_second_eof
        {
            self.bell_pending = true;
        }
    }

    fn signal_bof(&mut self) {
        if !self.flags.quiet && !self.flags.very_quiet {
            self.bell_pending = true;
        }
    }

    /// Post an error message; errors ring the bell unless very-quiet.
    fn error_message(&mut self, text: String) {
        self.message = Some(Message::Text(text));
        if !self.flags.very_quiet {
            self.bell_pending = true;
        }
    }

    fn check_quit_at_eof(&mut self) -> Result<()> {
        let reached = (self.flags.quit_at_first_eof && self.nb_eof > 0)
            || (self.flags.quit_at_second_eof && self.nb_eof > 1);
        if !reached {
            return Ok(());
        }
        if self.registry.index() + 1 < self.registry.source_count() {
            self.registry.set_index(self.registry.index() + 1);
            let opened = self.registry.open_active()?;
            self.after_open(opened);
        } else {
            self.quit = true;
        }
        Ok(())
    }

    // -- patterns ---------------------------------------------------------

    fn commit_pattern(&mut self, kind: PatternKind, raw: &str) -> Result<()> {
        self.message = None;
        self.history.reset_browse();

        let compiled = match kind {
            PatternKind::Filter => self.patterns.set_filter(raw),
            PatternKind::SearchForward | PatternKind::SearchBackward => {
                self.patterns.set_search(raw)
            }
        };
        if let Err(err) = compiled {
            let PagerError::Pattern { message } = err else {
                return Err(err);
            };
            // Drop only the kind that failed; the other pattern survives.
            match kind {
                PatternKind::Filter => {
                    let _ = self.patterns.set_filter("");
                }
                _ => self.patterns.clear_search(),
            }
            self.error_message(format!("Invalid pattern: {message} (Press a key)"));
            self.interpreter.await_keypress();
            return Ok(());
        }

        match kind {
            PatternKind::Filter => {}
            PatternKind::SearchForward => {
                self.search_forward = true;
                self.move_to_next_match()?;
            }
            PatternKind::SearchBackward => {
                // Seek toward the bottom of the cached region first so the
                // backward scan covers everything read so far.
                let rows = self.geom.rows;
                let cached = self.cached_lines();
                if cached.saturating_sub(self.view.first_line_to_display) <= rows {
                    self.view.first_line_to_display = cached;
                    self.view.offset_in_line = 0;
                } else {
                    self.move_forward(rows.saturating_sub(1))?;
                }
                self.move_to_previous_match()?;
                self.search_forward = false;
            }
        }

        self.history.push(raw);
        Ok(())
    }

    fn toggle_option(&mut self, kind: OptionKind) -> Result<()> {
        let text = match kind {
            OptionKind::QuitAtSecondEof => {
                self.flags.quit_at_second_eof = !self.flags.quit_at_second_eof;
                None
            }
            OptionKind::QuitAtFirstEof => {
                self.flags.quit_at_first_eof = !self.flags.quit_at_first_eof;
                None
            }
            OptionKind::PrintLines => {
                self.flags.print_line_numbers = !self.flags.print_line_numbers;
                Some(if self.flags.print_line_numbers {
                    "Constantly display line numbers"
                } else {
                    "Don't use line numbers"
                })
            }
            OptionKind::Quiet => {
                self.flags.quiet = !self.flags.quiet;
                self.flags.very_quiet = false;
                Some(if self.flags.quiet {
                    "Ring the bell for errors but not at eof/bof"
                } else {
                    "Ring the bell for errors AND at eof/bof"
                })
            }
            OptionKind::VeryQuiet => {
                self.flags.very_quiet = !self.flags.very_quiet;
                self.flags.quiet = false;
                Some(if self.flags.very_quiet {
                    "Never ring the bell"
                } else {
                    "Ring the bell for errors AND at eof/bof"
                })
            }
            OptionKind::ChopLongLines => {
                self.view.offset_in_line = 0;
                self.flags.chop_long_lines = !self.flags.chop_long_lines;
                Some(if self.flags.chop_long_lines {
                    "Chop long lines"
                } else {
                    "Fold long lines"
                })
            }
            OptionKind::IgnoreCaseCond => {
                self.flags.ignore_case_cond = !self.flags.ignore_case_cond;
                self.flags.ignore_case_always = false;
                Some(if self.flags.ignore_case_cond {
                    "Ignore case in searches"
                } else {
                    "Case is significant in searches"
                })
            }
            OptionKind::IgnoreCaseAlways => {
                self.flags.ignore_case_always = !self.flags.ignore_case_always;
                self.flags.ignore_case_cond = false;
                Some(if self.flags.ignore_case_always {
                    "Ignore case in searches and in patterns"
                } else {
                    "Case is significant in searches"
                })
            }
        };
        self.patterns.set_policy(case_policy(&self.flags))?;
        self.message = text.map(|t| Message::Text(t.to_string()));
        Ok(())
    }

    // -- sources ----------------------------------------------------------

    fn after_open(&mut self, message: String) {
        self.view.reset();
        self.nb_eof = 0;
        self.message = Some(Message::Text(message));
    }

    fn snapshot(&self, index: usize) -> SavedPosition {
        SavedPosition::capture(index, &self.view, self.flags.print_line_numbers)
    }

    fn try_open_or_rollback(&mut self, saved: SavedPosition) -> Result<()> {
        let failing = self.registry.active_name().to_string();
        match self.registry.open_active() {
            Ok(message) => {
                self.after_open(message);
                Ok(())
            }
            Err(PagerError::SourceNotFound { .. }) | Err(PagerError::NotAFile { .. }) => {
                self.rollback(saved, Some(failing))
            }
            Err(err) => Err(err),
        }
    }

    fn rollback(&mut self, saved: SavedPosition, failing: Option<String>) -> Result<()> {
        let clamped = saved
            .source_index
            .min(self.registry.source_count().saturating_sub(1));
        self.registry.set_index(clamped);
        let opened = self.registry.open_active()?;
        self.after_open(opened);
        saved.restore_view(&mut self.view);
        self.flags.print_line_numbers = saved.print_line_numbers;
        if let Some(name) = failing {
            self.error_message(format!("{name} not found!"));
        }
        Ok(())
    }

    fn next_file(&mut self, step: usize) -> Result<()> {
        let idx = self.registry.index();
        if idx + step >= self.registry.source_count() {
            self.error_message("No next file".to_string());
            return Ok(());
        }
        // The failed target sits above us, so removal leaves our index valid.
        let saved = self.snapshot(idx);
        self.registry.set_index(idx + step);
        self.try_open_or_rollback(saved)
    }

    fn prev_file(&mut self, step: usize) -> Result<()> {
        let idx = self.registry.index();
        if idx <= step {
            self.error_message("No previous file".to_string());
            return Ok(());
        }
        // Removal of the failed target shifts everything at or above it down.
        let saved = self.snapshot(idx - 1);
        self.registry.set_index(idx - step);
        self.try_open_or_rollback(saved)
    }

    fn goto_file(&mut self, target: usize) -> Result<()> {
        if target >= self.registry.source_count() {
            self.error_message("No such file".to_string());
            return Ok(());
        }
        let idx = self.registry.index();
        let saved = self.snapshot(if target < idx { idx - 1 } else { idx });
        self.registry.set_index(target);
        self.try_open_or_rollback(saved)
    }

    fn add_source(&mut self, spec: &str) -> Result<()> {
        self.message = None;
        let saved = self.snapshot(self.registry.index());
        if let Err(err) = self.registry.add_source(spec) {
            self.error_message(err.to_string());
            return Ok(());
        }
        self.try_open_or_rollback(saved)
    }

    fn delete_file(&mut self) -> Result<()> {
        if let Some(message) = self.registry.delete_active()? {
            self.after_open(message);
        }
        Ok(())
    }

    // -- help -------------------------------------------------------------

    fn enter_help(&mut self) -> Result<()> {
        self.saved_before_help = Some(self.snapshot(self.registry.index()));
        self.flags.print_line_numbers = false;
        self.registry.set_index(0);
        let opened = self.registry.open_active()?;
        self.after_open(opened);
        Ok(())
    }

    fn leave_help(&mut self) -> Result<()> {
        let Some(saved) = self.saved_before_help.take() else {
            return Ok(());
        };
        self.rollback(saved, None)
    }

    // -- composition ------------------------------------------------------

    fn cached_lines(&mut self) -> usize {
        self.registry.cache_mut().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Compose a full frame. `show_pending` gates the echo of an unresolved
    /// key sequence; the loop passes `false` while more input is queued.
    pub fn render_frame(&mut self, show_pending: bool) -> Result<ScreenFrame> {
        let buffer = self.interpreter.buffer_display();
        let pending = if show_pending {
            self.interpreter.pending_display()
        } else {
            None
        };
        let cursor_column = self
            .interpreter
            .cursor_column()
            .map(|col| col.min(u16::MAX as usize - 1) as u16 + 1);

        let is_help = self.registry.is_help_active();
        let source_name = self.registry.active_name().to_string();
        let file_label = (!is_help && self.registry.real_count() > 1)
            .then(|| (self.registry.index(), self.registry.real_count()));
        let total_lines = self.registry.active_total_lines();
        let first_line = self.view.first_line_to_display;
        let filter_active = self.patterns.filter().is_some();
        let geom = self.geom;
        let line_numbers = self.flags.print_line_numbers;
        let chop = self.flags.chop_long_lines;

        let patterns = &self.patterns;
        let view = &self.view;
        let Some(cache) = self.registry.cache_mut() else {
            return Err(PagerError::terminal("no open source to display"));
        };
        let frame = compose_content(ContentInputs {
            cache: &mut *cache,
            filter: patterns.filter(),
            search: patterns.search(),
            is_help,
            view,
            geom,
            line_numbers,
            chop,
        })?;
        let cached_lines = cache.len();

        let status = compose_status(
            StatusInputs {
                buffer,
                pending,
                message: self.message.as_ref(),
                filter_active,
                source_name: &source_name,
                file_label,
                total_lines,
                first_line,
                cached_lines,
            },
            &frame,
        );

        Ok(ScreenFrame {
            rows: frame.rows,
            status,
            cursor_column,
        })
    }

    /// Probe whether the active source fits in one window; used before the
    /// alternate screen is entered when quit-if-one-screen is set.
    pub fn probe_one_screen(&mut self) -> Result<Option<Vec<StyledLine>>> {
        let is_help = self.registry.is_help_active();
        let geom = self.geom;
        let line_numbers = self.flags.print_line_numbers;
        let chop = self.flags.chop_long_lines;
        let patterns = &self.patterns;
        let view = &self.view;
        let Some(cache) = self.registry.cache_mut() else {
            return Ok(None);
        };
        compose_one_screen(ContentInputs {
            cache,
            filter: patterns.filter(),
            search: patterns.search(),
            is_help,
            view,
            geom,
            line_numbers,
            chop,
        })
    }

    // Read-only state accessors, used by the loop and by tests.

    pub fn view(&self) -> &ViewPosition {
        &self.view
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }
}

fn case_policy(flags: &Flags) -> CasePolicy {
    if flags.ignore_case_always {
        CasePolicy::Insensitive
    } else if flags.ignore_case_cond {
        CasePolicy::Smart
    } else {
        CasePolicy::Sensitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::source::{FileSource, Source, StaticSource};
    use crate::text::TabStops;
    use std::path::PathBuf;

    fn static_src(name: &str, content: String) -> Box<dyn Source> {
        Box::new(StaticSource::new(name, content))
    }

    fn missing_src(name: &str) -> Box<dyn Source> {
        Box::new(FileSource::with_name("/definitely/not/here", name))
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("line {i}\n")).collect()
    }

    fn session_over(sources: Vec<Box<dyn Source>>, flags: Flags) -> PagerSession {
        let registry = SourceRegistry::new(
            sources,
            PathBuf::from("."),
            TabStops::default(),
            CancelToken::new(),
        )
        .unwrap();
        // 10 content rows plus the status row.
        let geom = Geometry { columns: 80, rows: 11 };
        PagerSession::new(registry, flags, geom).unwrap()
    }

    fn single(lines: usize) -> PagerSession {
        session_over(vec![static_src("only.txt", numbered(lines))], Flags::default())
    }

    fn feed(session: &mut PagerSession, input: &str) {
        for c in input.chars() {
            session.handle_key(KeyPress::Char(c)).unwrap();
        }
    }

    fn message_text(session: &PagerSession) -> Option<String> {
        match session.message() {
            Some(Message::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    #[test]
    fn opening_posts_the_file_of_n_message() {
        let session = session_over(
            vec![
                static_src("a.txt", numbered(3)),
                static_src("b.txt", numbered(3)),
            ],
            Flags::default(),
        );
        assert_eq!(message_text(&session).as_deref(), Some("a.txt (file 1 of 2)"));

        let session = single(3);
        assert_eq!(message_text(&session).as_deref(), Some("only.txt"));
    }

    #[test]
    fn window_paging_stops_once_the_lookahead_runs_out() {
        let mut session = single(30);
        feed(&mut session, "f");
        assert_eq!(session.view().first_line_to_display, 10);

        // The second window still fills: the lookahead from 19 ends on
        // line 29, the last real line.
        feed(&mut session, "f");
        assert_eq!(session.view().first_line_to_display, 20);
        assert_eq!(session.message(), None);

        // The third is refused; the ten-line lookahead runs past the end.
        feed(&mut session, "f");
        assert_eq!(session.view().first_line_to_display, 20);
        assert_eq!(message_text(&session).as_deref(), Some("(END)"));
        assert!(session.take_bell());
    }

    #[test]
    fn numeric_prefix_scales_a_line_step() {
        let mut session = single(30);
        feed(&mut session, "5j");
        assert_eq!(session.view().first_line_to_display, 5);
        feed(&mut session, "3k");
        assert_eq!(session.view().first_line_to_display, 2);
    }

    #[test]
    fn backward_at_the_top_rings_and_stays() {
        let mut session = single(30);
        feed(&mut session, "b");
        assert_eq!(session.view().first_line_to_display, 0);
        assert!(session.take_bell());
    }

    #[test]
    fn end_jump_lands_on_the_last_window() {
        let mut session = single(30);
        feed(&mut session, "G");
        assert_eq!(session.view().first_line_to_display, 20);
        assert_eq!(message_text(&session).as_deref(), Some("(END)"));
    }

    #[test]
    fn eof_on_a_middle_file_names_the_next_one() {
        let mut session = session_over(
            vec![
                static_src("a.txt", numbered(3)),
                static_src("b.txt", numbered(3)),
            ],
            Flags::default(),
        );
        feed(&mut session, "f");
        assert_eq!(message_text(&session).as_deref(), Some("(END) - Next: b.txt"));
    }

    #[test]
    fn search_jumps_past_the_top_line_and_repeats_flip_direction() {
        let mut session = single(30);
        feed(&mut session, "/line 2");
        session.handle_key(KeyPress::Enter).unwrap();
        assert_eq!(session.view().first_line_to_display, 2);
        assert_eq!(session.message(), None);

        // Reverse repeat: nothing matching above line 2.
        feed(&mut session, "N");
        assert_eq!(message_text(&session).as_deref(), Some("Pattern not found"));
        assert_eq!(session.view().first_line_to_display, 2);

        // Forward repeat finds "line 20".
        feed(&mut session, "n");
        assert_eq!(session.view().first_line_to_display, 20);
    }

    #[test]
    fn repeat_without_a_pattern_reports_not_found() {
        let mut session = single(10);
        feed(&mut session, "n");
        assert_eq!(message_text(&session).as_deref(), Some("Pattern not found"));
    }

    #[test]
    fn invalid_pattern_is_acknowledged_by_one_key() {
        let mut session = single(10);
        feed(&mut session, "/[");
        session.handle_key(KeyPress::Enter).unwrap();
        let message = message_text(&session).unwrap();
        assert!(message.starts_with("Invalid pattern:"), "{message}");
        assert!(message.ends_with("(Press a key)"), "{message}");

        // The acknowledging key is swallowed, not dispatched.
        feed(&mut session, "j");
        assert_eq!(session.message(), None);
        assert_eq!(session.view().first_line_to_display, 0);
    }

    #[test]
    fn filter_restricts_composed_rows() {
        let mut session = session_over(
            vec![static_src(
                "mixed.txt",
                "keep one\ndrop\nkeep two\n".to_string(),
            )],
            Flags::default(),
        );
        feed(&mut session, "&keep");
        session.handle_key(KeyPress::Enter).unwrap();
        let frame = session.render_frame(true).unwrap();
        assert_eq!(frame.rows[0].text(), "keep one");
        assert_eq!(frame.rows[1].text(), "keep two");
        assert_eq!(frame.rows[2].text(), "~");
    }

    #[test]
    fn history_recall_fills_the_open_prompt() {
        let mut session = single(30);
        feed(&mut session, "/line 2");
        session.handle_key(KeyPress::Enter).unwrap();

        feed(&mut session, "/");
        session.handle_key(KeyPress::Up).unwrap();
        let frame = session.render_frame(true).unwrap();
        assert_eq!(frame.status.to_string(), " /line 2");
    }

    #[test]
    fn option_toggle_reports_and_flips_the_flag() {
        let mut session = single(10);
        feed(&mut session, "-N");
        assert!(session.flags().print_line_numbers);
        assert_eq!(
            message_text(&session).as_deref(),
            Some("Constantly display line numbers")
        );
        feed(&mut session, "-N");
        assert!(!session.flags().print_line_numbers);
        assert_eq!(message_text(&session).as_deref(), Some("Don't use line numbers"));
    }

    #[test]
    fn case_toggle_recompiles_the_live_pattern() {
        let mut session = single(30);
        feed(&mut session, "-I");
        assert_eq!(
            message_text(&session).as_deref(),
            Some("Ignore case in searches and in patterns")
        );
        feed(&mut session, "/LINE 2");
        session.handle_key(KeyPress::Enter).unwrap();
        assert_eq!(session.view().first_line_to_display, 2);
    }

    #[test]
    fn quiet_toggles_clear_their_sibling() {
        let mut session = single(10);
        feed(&mut session, "-q");
        assert!(session.flags().quiet);
        feed(&mut session, "-Q");
        assert!(session.flags().very_quiet);
        assert!(!session.flags().quiet);
        assert_eq!(message_text(&session).as_deref(), Some("Never ring the bell"));

        // No bell at eof while very quiet.
        feed(&mut session, "f");
        assert!(!session.take_bell());
    }

    #[test]
    fn pan_moves_half_a_screen_and_back() {
        let mut session = single(10);
        session.handle_key(KeyPress::Right).unwrap();
        assert_eq!(session.view().first_column_to_display, 40);
        session.handle_key(KeyPress::Left).unwrap();
        assert_eq!(session.view().first_column_to_display, 0);
    }

    #[test]
    fn file_navigation_round_trips_and_bounds_report() {
        let mut session = session_over(
            vec![
                static_src("a.txt", numbered(3)),
                static_src("b.txt", numbered(3)),
            ],
            Flags::default(),
        );
        feed(&mut session, ":n");
        assert_eq!(session.registry().active_name(), "b.txt");
        assert_eq!(message_text(&session).as_deref(), Some("b.txt (file 2 of 2)"));

        feed(&mut session, ":n");
        assert_eq!(message_text(&session).as_deref(), Some("No next file"));

        feed(&mut session, ":p");
        assert_eq!(session.registry().active_name(), "a.txt");
        feed(&mut session, ":p");
        assert_eq!(message_text(&session).as_deref(), Some("No previous file"));
    }

    #[test]
    fn failed_file_switch_rolls_the_view_back() {
        let mut session = session_over(
            vec![static_src("a.txt", numbered(30)), missing_src("gone.txt")],
            Flags::default(),
        );
        feed(&mut session, "5j");
        feed(&mut session, ":n");
        assert_eq!(session.registry().active_name(), "a.txt");
        assert_eq!(session.view().first_line_to_display, 5);
        assert_eq!(message_text(&session).as_deref(), Some("gone.txt not found!"));
    }

    #[test]
    fn delete_drops_the_active_file() {
        let mut session = session_over(
            vec![
                static_src("a.txt", numbered(3)),
                static_src("b.txt", numbered(3)),
            ],
            Flags::default(),
        );
        feed(&mut session, ":d");
        assert_eq!(session.registry().real_count(), 1);
        assert_eq!(session.registry().active_name(), "b.txt");

        // The last file cannot be deleted.
        feed(&mut session, ":d");
        assert_eq!(session.registry().real_count(), 1);
    }

    #[test]
    fn help_restricts_commands_and_restores_on_exit() {
        let mut session = single(30);
        feed(&mut session, "5j");
        feed(&mut session, "h");
        assert!(session.registry().is_help_active());
        assert_eq!(session.view().first_line_to_display, 0);

        // Line steps are ignored inside help.
        feed(&mut session, "j");
        assert_eq!(session.view().first_line_to_display, 0);

        // Window paging works.
        feed(&mut session, "f");
        assert_eq!(session.view().first_line_to_display, 10);

        // q leaves help instead of quitting and restores the view.
        feed(&mut session, "q");
        assert!(!session.should_quit());
        assert!(!session.registry().is_help_active());
        assert_eq!(session.view().first_line_to_display, 5);
    }

    #[test]
    fn quit_commands_set_the_flag() {
        let mut session = single(10);
        feed(&mut session, "q");
        assert!(session.should_quit());

        let mut session = single(10);
        feed(&mut session, ":q");
        assert!(session.should_quit());

        let mut session = single(10);
        feed(&mut session, "ZZ");
        assert!(session.should_quit());
    }

    #[test]
    fn quit_at_first_eof_leaves_after_the_signal() {
        let flags = Flags {
            quit_at_first_eof: true,
            ..Flags::default()
        };
        let mut session = session_over(vec![static_src("short.txt", numbered(3))], flags);
        feed(&mut session, "f");
        assert!(session.should_quit());
    }

    #[test]
    fn quit_at_eof_advances_through_remaining_files_first() {
        let flags = Flags {
            quit_at_first_eof: true,
            ..Flags::default()
        };
        let mut session = session_over(
            vec![
                static_src("a.txt", numbered(3)),
                static_src("b.txt", numbered(3)),
            ],
            flags,
        );
        feed(&mut session, "f");
        assert!(!session.should_quit());
        assert_eq!(session.registry().active_name(), "b.txt");

        feed(&mut session, "f");
        assert!(session.should_quit());
    }

    #[test]
    fn file_info_message_renders_the_stats_line() {
        let mut session = single(3);
        feed(&mut session, "=");
        let frame = session.render_frame(true).unwrap();
        assert_eq!(frame.status.to_string(), "only.txt lines 1-3/3 (END)");
    }

    #[test]
    fn probe_detects_a_one_screen_source() {
        let mut session = single(3);
        let rows = session.probe_one_screen().unwrap().expect("fits");
        assert_eq!(rows.len(), 3);

        let mut session = single(30);
        assert!(session.probe_one_screen().unwrap().is_none());
    }
}
