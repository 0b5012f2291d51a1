//! View state shared by navigation, the interpreter, and the composer.

/// Where the view sits inside the active source.
///
/// Invariant: `first_line_in_memory <= first_line_to_display`. The position
/// is reset to a fresh empty state whenever the active source changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewPosition {
    /// First cached line index still in memory (the cache never evicts, so
    /// this stays 0 for the lifetime of one open source).
    pub first_line_in_memory: usize,
    /// Index of the first line candidate to display; display resolves forward
    /// to the next displayable line from here.
    pub first_line_to_display: usize,
    /// Horizontal pan offset applied to every content row.
    pub first_column_to_display: usize,
    /// Column offset into the top line when a long line is mid-wrap.
    pub offset_in_line: usize,
}

impl ViewPosition {
    pub fn reset(&mut self) {
        *self = ViewPosition::default();
    }
}

/// Terminal geometry in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: usize,
    pub rows: usize,
}

impl Geometry {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns: columns as usize,
            rows: rows as usize,
        }
    }

    /// Content width once the line-number gutter is accounted for.
    pub fn content_width(&self, line_numbers: bool) -> usize {
        self.columns
            .saturating_sub(if line_numbers { LINE_NUMBER_WIDTH } else { 0 })
    }

    /// Content rows per frame (everything but the status row).
    pub fn content_rows(&self) -> usize {
        self.rows.saturating_sub(1)
    }
}

/// Width of the `%7d ` line-number gutter.
pub const LINE_NUMBER_WIDTH: usize = 8;

/// Engine toggles, settable from the CLI and flipped in-session through
/// option entry. Each member of a mutually exclusive pair clears its sibling
/// on activation (handled by the dispatcher).
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub quit_at_second_eof: bool,
    pub quit_at_first_eof: bool,
    pub quit_if_one_screen: bool,
    pub print_line_numbers: bool,
    pub quiet: bool,
    pub very_quiet: bool,
    pub chop_long_lines: bool,
    pub ignore_case_cond: bool,
    pub ignore_case_always: bool,
}

/// Snapshot taken before any file-navigation attempt, used to roll the whole
/// view back when the target source cannot be opened.
#[derive(Debug, Clone, Copy)]
pub struct SavedPosition {
    pub source_index: usize,
    pub first_line_to_display: usize,
    pub first_column_to_display: usize,
    pub offset_in_line: usize,
    pub print_line_numbers: bool,
}

impl SavedPosition {
    pub fn capture(source_index: usize, view: &ViewPosition, line_numbers: bool) -> Self {
        Self {
            source_index,
            first_line_to_display: view.first_line_to_display,
            first_column_to_display: view.first_column_to_display,
            offset_in_line: view.offset_in_line,
            print_line_numbers: line_numbers,
        }
    }

    pub fn restore_view(&self, view: &mut ViewPosition) {
        view.first_line_to_display = self.first_line_to_display;
        view.first_column_to_display = self.first_column_to_display;
        view.offset_in_line = self.offset_in_line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_width_reserves_the_number_gutter() {
        let geom = Geometry::new(80, 24);
        assert_eq!(geom.content_width(false), 80);
        assert_eq!(geom.content_width(true), 72);
        assert_eq!(geom.content_rows(), 23);
    }

    #[test]
    fn snapshot_round_trips_the_view_fields() {
        let mut view = ViewPosition {
            first_line_in_memory: 0,
            first_line_to_display: 42,
            first_column_to_display: 8,
            offset_in_line: 16,
        };
        let saved = SavedPosition::capture(3, &view, true);
        view.reset();
        assert_eq!(view, ViewPosition::default());
        saved.restore_view(&mut view);
        assert_eq!(view.first_line_to_display, 42);
        assert_eq!(view.first_column_to_display, 8);
        assert_eq!(view.offset_in_line, 16);
    }
}
