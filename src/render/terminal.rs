//! Terminal lifecycle and painting with ratatui.
//!
//! Raw mode and the alternate screen are entered on `initialize` and left on
//! `cleanup`; `Drop` covers the panic and early-return paths. Painting goes
//! through `Terminal::draw`, which diffs frames, so a repaint after no state
//! change is cheap.

use crate::error::Result;
use crate::text::StyledLine;
use crate::view::Geometry;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout, Write};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// A fully composed screen ready to paint.
#[derive(Debug)]
pub struct ScreenFrame {
    pub rows: Vec<StyledLine>,
    pub status: Line<'static>,
    /// Cursor column in the status row while a prompt is open.
    pub cursor_column: Option<u16>,
}

pub struct TerminalUi {
    terminal: Option<CrosstermTerminal>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self { terminal: None }
    }

    pub fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        self.terminal = Some(Terminal::new(CrosstermBackend::new(stdout))?);
        Ok(())
    }

    pub fn size(&self) -> Result<Geometry> {
        let (columns, rows) = ratatui::crossterm::terminal::size()?;
        Ok(Geometry::new(columns, rows))
    }

    pub fn paint(&mut self, frame: &ScreenFrame) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(f.size());

            let content: Vec<Line> = frame.rows.iter().map(StyledLine::to_line).collect();
            f.render_widget(Paragraph::new(content), chunks[0]);
            f.render_widget(Paragraph::new(frame.status.clone()), chunks[1]);
            if let Some(col) = frame.cursor_column {
                f.set_cursor(chunks[1].x.saturating_add(col), chunks[1].y);
            }
        })?;
        Ok(())
    }

    /// Force a full redraw on the next paint.
    pub fn clear(&mut self) -> Result<()> {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.clear()?;
        }
        Ok(())
    }

    pub fn bell(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }

    pub fn cleanup(&mut self) -> Result<()> {
        if self.terminal.take().is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
        }
        Ok(())
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Print probe-mode rows to the main screen (quit-if-one-screen).
pub fn print_lines(rows: &[StyledLine]) {
    for row in rows {
        println!("{}", row.text());
    }
}
