//! Display composition: content rows plus the status row.
//!
//! Composition is pure over the cache and view state so it can be tested
//! without a terminal. A frame holds `rows - 1` content rows; the status row
//! is built separately because its precedence chain mixes interpreter state
//! (buffers, pending sequences) with session state (messages, filter flag).
//!
//! Wrap mode emits width-limited prefixes of a long line and carries the
//! remainder into the next row; chop/pan instead slices one column window out
//! of every line. Rows past end-of-stream render as `~` fillers.

use crate::cache::LineCache;
use crate::error::Result;
use crate::navigate;
use crate::search::CompiledPattern;
use crate::text::{match_style, StyledLine};
use crate::view::{Geometry, ViewPosition};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// A transient status-row message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    /// Placeholder resolved at compose time into
    /// "name (file i of n) lines a-b/total".
    FileInfo,
}

/// Everything content composition reads.
pub struct ContentInputs<'a> {
    pub cache: &'a mut LineCache,
    pub filter: Option<&'a CompiledPattern>,
    pub search: Option<&'a CompiledPattern>,
    pub is_help: bool,
    pub view: &'a ViewPosition,
    pub geom: Geometry,
    pub line_numbers: bool,
    pub chop: bool,
}

/// Composed content rows plus what the status row needs to know about them.
#[derive(Debug)]
pub struct ContentFrame {
    pub rows: Vec<StyledLine>,
    /// 1-based number of the last real line shown.
    pub last_line: usize,
    /// The frame ran past end-of-stream.
    pub hit_end: bool,
    /// Row index of the first `~` filler, if any.
    filler_from: Option<usize>,
}

/// Compose one window of content.
pub fn compose_content(inputs: ContentInputs<'_>) -> Result<ContentFrame> {
    let ContentInputs {
        cache,
        filter,
        search,
        is_help,
        view,
        geom,
        line_numbers,
        chop,
    } = inputs;

    let width = geom.content_width(line_numbers).max(1);
    let mut rows = Vec::with_capacity(geom.content_rows());
    let mut input_line = view.first_line_to_display;
    let mut last_line = view.first_line_to_display;
    let mut hit_end = false;
    let mut filler_from = None;
    let mut carry: Option<StyledLine> = None;

    for terminal_row in 0..geom.content_rows() {
        let (current, filler) = match carry.take() {
            Some(line) => (line, false),
            None => {
                let scan = navigate::next_displayable(cache, filter, is_help, input_line)?;
                input_line = scan.next;
                match scan.line {
                    Some(idx) => {
                        last_line = scan.next;
                        let line = match cache.get_line(idx)? {
                            Some(line) => line.clone(),
                            None => StyledLine::default(),
                        };
                        let line = match search {
                            Some(pattern) => {
                                let ranges = pattern.match_ranges(line.text());
                                line.style_ranges(&ranges, match_style())
                            }
                            None => line,
                        };
                        (line, false)
                    }
                    None => {
                        hit_end = true;
                        filler_from.get_or_insert(terminal_row);
                        (StyledLine::from_plain("~"), true)
                    }
                }
            }
        };

        let to_display = if view.first_column_to_display > 0 || chop {
            let mut off = view.first_column_to_display;
            if terminal_row == 0 && view.offset_in_line > 0 {
                off = off.max(view.offset_in_line);
            }
            current.column_sub(off, off.saturating_add(width))
        } else {
            let current = if terminal_row == 0 && view.offset_in_line > 0 {
                current.column_sub(view.offset_in_line, usize::MAX)
            } else {
                current
            };
            let (head, tail) = current.split_at_column(width);
            if !tail.is_empty() {
                carry = Some(tail);
            }
            head
        };

        if line_numbers && !filler {
            rows.push(to_display.with_prefix(&format!("{:7} ", input_line)));
        } else {
            rows.push(to_display);
        }
    }

    Ok(ContentFrame {
        rows,
        last_line,
        hit_end,
        filler_from,
    })
}

/// Probe whether the whole stream fits in one window. Returns the rows to
/// print when it does, `None` when it does not.
pub fn compose_one_screen(inputs: ContentInputs<'_>) -> Result<Option<Vec<StyledLine>>> {
    let frame = compose_content(inputs)?;
    if !frame.hit_end {
        return Ok(None);
    }
    let cut = frame.filler_from.unwrap_or(frame.rows.len());
    let mut rows = frame.rows;
    rows.truncate(cut);
    Ok(Some(rows))
}

/// Session-side inputs to status composition.
pub struct StatusInputs<'a> {
    /// Interpreter buffer (count, option text, or an open prompt).
    pub buffer: Option<String>,
    /// Unresolved multi-key sequence; only shown when no input is queued.
    pub pending: Option<String>,
    pub message: Option<&'a Message>,
    pub filter_active: bool,
    pub source_name: &'a str,
    /// (index, count) shown when more than one real source is open.
    pub file_label: Option<(usize, usize)>,
    pub total_lines: Option<u64>,
    /// Top line index of the composed frame.
    pub first_line: usize,
    /// Cached line count, the total fallback for streams of unknown length.
    pub cached_lines: usize,
}

/// Build the status row. Precedence: input buffer, then a pending key
/// sequence, then the transient message (inverse video), then the filter
/// indicator, then the idle colon.
pub fn compose_status(inputs: StatusInputs<'_>, frame: &ContentFrame) -> Line<'static> {
    if let Some(buffer) = inputs.buffer {
        return Line::from(format!(" {buffer}"));
    }
    if let Some(pending) = inputs.pending {
        return Line::from(format!(" {pending}"));
    }
    if let Some(message) = inputs.message {
        let text = match message {
            Message::Text(text) => text.clone(),
            Message::FileInfo => {
                let label = inputs
                    .file_label
                    .map(|(i, n)| format!(" (file {i} of {n})"))
                    .unwrap_or_default();
                let total = inputs.total_lines.unwrap_or(inputs.cached_lines as u64);
                let tail = if frame.hit_end { " (END)" } else { "" };
                format!(
                    "{}{label} lines {}-{}/{}{}",
                    inputs.source_name,
                    inputs.first_line + 1,
                    frame.last_line,
                    total,
                    tail
                )
            }
        };
        return Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    if inputs.filter_active {
        Line::from("&")
    } else {
        Line::from(":")
    }
}
