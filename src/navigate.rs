//! Navigation arithmetic over the line cache.
//!
//! All movement works on *displayable* lines: every cached line when no
//! filter is active (or the help source is shown), otherwise only lines
//! matching the filter pattern. The view's `first_line_to_display` is a
//! candidate start; display and forward scans resolve it to the next
//! displayable line, so a filtered-out top index is harmless.
//!
//! Forward movement performs a one-window lookahead per unit step: when the
//! window ahead of the current top already reaches end-of-stream the step is
//! refused and the end-of-stream signal fires instead, exactly like classic
//! `less`. In wrap mode a unit step may advance the column offset within a
//! long top line before moving on to the next displayable line; backward
//! movement undoes offsets first and re-aligns to the previous line's last
//! full-width segment.

use crate::cache::LineCache;
use crate::error::Result;
use crate::search::CompiledPattern;
use crate::view::{Geometry, ViewPosition};

/// End jump sentinel for [`Navigator::move_forward`].
pub const TO_END: usize = usize::MAX;

/// Result of a forward scan for a displayable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    /// The candidate start for the scan that follows this one: one past the
    /// line that was found (or one past the end-of-stream point).
    pub next: usize,
    /// Index of the displayable line found, `None` at end-of-stream.
    pub line: Option<usize>,
}

/// How a movement operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Forward movement ran out of stream; position left at the last
    /// reachable point.
    EndOfStream,
    /// Backward movement ran out of displayable lines above.
    BeginOfStream,
    /// Search navigation found no matching displayable line.
    PatternNotFound,
    /// Absolute seek target does not exist (0-based index carried for the
    /// message).
    Unreachable(usize),
}

/// Scan forward from `from` for the first displayable line.
pub fn next_displayable(
    cache: &mut LineCache,
    filter: Option<&CompiledPattern>,
    is_help: bool,
    from: usize,
) -> Result<Scan> {
    let mut idx = from;
    loop {
        match cache.get_line(idx)? {
            None => {
                return Ok(Scan {
                    next: idx + 1,
                    line: None,
                })
            }
            Some(line) => {
                if is_help || filter.map_or(true, |f| f.is_match(line.text())) {
                    return Ok(Scan {
                        next: idx + 1,
                        line: Some(idx),
                    });
                }
            }
        }
        idx += 1;
    }
}

/// Scan backward from just before `from`, bounded below by `lower`. Returns
/// the index of the nearest displayable line, or `None` when the scan reaches
/// the bound without one.
pub fn prev_displayable(
    cache: &mut LineCache,
    filter: Option<&CompiledPattern>,
    is_help: bool,
    from: usize,
    lower: usize,
) -> Result<Option<usize>> {
    let mut idx = from;
    while idx > lower {
        idx -= 1;
        if let Some(line) = cache.get_line(idx)? {
            if is_help || filter.map_or(true, |f| f.is_match(line.text())) {
                return Ok(Some(idx));
            }
        }
    }
    Ok(None)
}

/// Movement engine borrowing everything a move needs.
pub struct Navigator<'a> {
    pub cache: &'a mut LineCache,
    pub filter: Option<&'a CompiledPattern>,
    pub search: Option<&'a CompiledPattern>,
    pub is_help: bool,
    pub total_lines: Option<u64>,
    pub view: &'a mut ViewPosition,
    pub geom: Geometry,
    pub line_numbers: bool,
    pub chop: bool,
}

impl Navigator<'_> {
    fn content_width(&self) -> usize {
        self.geom.content_width(self.line_numbers).max(1)
    }

    fn scan_next(&mut self, from: usize) -> Result<Scan> {
        next_displayable(self.cache, self.filter, self.is_help, from)
    }

    fn scan_prev(&mut self, from: usize) -> Result<Option<usize>> {
        prev_displayable(
            self.cache,
            self.filter,
            self.is_help,
            from,
            self.view.first_line_in_memory,
        )
    }

    /// Advance the view by `count` logical screen advances. [`TO_END`] jumps
    /// to the last window: with a known total line count the target is found
    /// by walking `rows - 1` displayable lines back from the end, otherwise
    /// by stepping forward until the stream is exhausted.
    pub fn move_forward(&mut self, count: usize) -> Result<MoveOutcome> {
        let width = self.content_width();
        let height = self.geom.rows;
        let do_offsets = self.view.first_column_to_display == 0 && !self.chop;

        if count == TO_END {
            if let Some(total) = self.total_lines {
                self.view.first_line_to_display = total as usize;
                self.view.offset_in_line = 0;
                for _ in 0..height.saturating_sub(1) {
                    match self.scan_prev(self.view.first_line_to_display)? {
                        Some(idx) => self.view.first_line_to_display = idx,
                        None => {
                            self.view.first_line_to_display = self.view.first_line_in_memory;
                            break;
                        }
                    }
                }
            }
        }

        let mut remaining = count;
        while remaining > 0 {
            remaining -= 1;

            // One window of lookahead: the step is refused once the window
            // ahead of the current top no longer fills with real lines.
            let mut last = self.view.first_line_to_display;
            if !do_offsets {
                for _ in 0..height.saturating_sub(1) {
                    last = self.scan_next(last)?.next;
                }
            } else {
                let mut off = self.view.offset_in_line;
                for _ in 0..height.saturating_sub(1) {
                    let scan = self.scan_next(last)?;
                    match scan.line {
                        None => {
                            last = scan.next;
                            break;
                        }
                        Some(idx) => {
                            let line_width = self.cache.line_width(idx)?.unwrap_or(0);
                            if line_width > off + width {
                                off += width;
                            } else {
                                off = 0;
                                last = scan.next;
                            }
                        }
                    }
                }
            }
            if self.cache.get_line(last)?.is_none() {
                return Ok(MoveOutcome::EndOfStream);
            }

            let scan = self.scan_next(self.view.first_line_to_display)?;
            let top_width = match scan.line {
                Some(idx) => self.cache.line_width(idx)?.unwrap_or(0),
                None => 0,
            };
            if do_offsets && scan.line.is_some() && top_width > width + self.view.offset_in_line {
                self.view.offset_in_line += width;
            } else {
                self.view.offset_in_line = 0;
                self.view.first_line_to_display = scan.next;
            }
        }
        Ok(MoveOutcome::Moved)
    }

    /// Move the view backward by `count` logical screen advances.
    pub fn move_backward(&mut self, count: usize) -> Result<MoveOutcome> {
        let width = self.content_width();
        let wrap = self.view.first_column_to_display == 0 && !self.chop;

        for _ in 0..count {
            if self.view.offset_in_line > 0 {
                self.view.offset_in_line = self.view.offset_in_line.saturating_sub(width);
            } else if self.view.first_line_in_memory < self.view.first_line_to_display {
                match self.scan_prev(self.view.first_line_to_display)? {
                    Some(idx) => {
                        self.view.first_line_to_display = idx;
                        if wrap {
                            let line_width = self.cache.line_width(idx)?.unwrap_or(0);
                            self.view.offset_in_line = last_segment_start(line_width, width);
                        }
                    }
                    None => return Ok(MoveOutcome::BeginOfStream),
                }
            } else {
                return Ok(MoveOutcome::BeginOfStream);
            }
        }
        Ok(MoveOutcome::Moved)
    }

    /// Seek to an absolute 0-based line.
    pub fn move_to(&mut self, line: usize) -> Result<MoveOutcome> {
        if self.cache.get_line(line)?.is_some() {
            self.view.first_line_to_display = line;
            self.view.offset_in_line = 0;
            Ok(MoveOutcome::Moved)
        } else {
            Ok(MoveOutcome::Unreachable(line))
        }
    }

    /// Jump to the first displayable line strictly after the top that
    /// matches the search pattern.
    pub fn move_to_next_match(&mut self) -> Result<MoveOutcome> {
        let Some(pattern) = self.search else {
            return Ok(MoveOutcome::PatternNotFound);
        };
        let filter = self.filter;
        let is_help = self.is_help;
        let mut idx = self.view.first_line_to_display + 1;
        loop {
            match self.cache.get_line(idx)? {
                None => return Ok(MoveOutcome::PatternNotFound),
                Some(line) => {
                    let displayable =
                        is_help || filter.map_or(true, |f| f.is_match(line.text()));
                    if displayable && pattern.is_match(line.text()) {
                        self.view.first_line_to_display = idx;
                        self.view.offset_in_line = 0;
                        return Ok(MoveOutcome::Moved);
                    }
                }
            }
            idx += 1;
        }
    }

    /// Jump to the nearest displayable match strictly before the top,
    /// bounded below by `first_line_in_memory`.
    pub fn move_to_previous_match(&mut self) -> Result<MoveOutcome> {
        let Some(pattern) = self.search else {
            return Ok(MoveOutcome::PatternNotFound);
        };
        let filter = self.filter;
        let is_help = self.is_help;
        let mut idx = self.view.first_line_to_display;
        while idx > self.view.first_line_in_memory {
            idx -= 1;
            if let Some(line) = self.cache.get_line(idx)? {
                let displayable = is_help || filter.map_or(true, |f| f.is_match(line.text()));
                if displayable && pattern.is_match(line.text()) {
                    self.view.first_line_to_display = idx;
                    self.view.offset_in_line = 0;
                    return Ok(MoveOutcome::Moved);
                }
            }
        }
        Ok(MoveOutcome::PatternNotFound)
    }
}

/// Column where the last `width`-sized segment of a wrapped line starts, so
/// backward paging lands on the tail of the line.
fn last_segment_start(line_width: usize, width: usize) -> usize {
    if line_width == 0 {
        0
    } else if line_width % width == 0 {
        line_width - width
    } else {
        line_width - line_width % width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::CasePolicy;
    use crate::text::TabStops;
    use std::io::Cursor;

    fn cache_over(content: &str) -> LineCache {
        LineCache::new(
            Box::new(Cursor::new(content.as_bytes().to_vec())),
            TabStops::default(),
        )
    }

    fn numbered_lines(n: usize) -> String {
        (0..n).map(|i| format!("line {i}\n")).collect()
    }

    struct Fixture {
        cache: LineCache,
        view: ViewPosition,
        filter: Option<CompiledPattern>,
        total: Option<u64>,
    }

    impl Fixture {
        fn new(content: &str) -> Self {
            let total = content.lines().count() as u64;
            Self {
                cache: cache_over(content),
                view: ViewPosition::default(),
                filter: None,
                total: Some(total),
            }
        }

        fn with_filter(mut self, raw: &str) -> Self {
            self.filter = Some(CompiledPattern::compile(raw, CasePolicy::Sensitive).unwrap());
            self
        }

        fn nav(&mut self, geom: Geometry) -> Navigator<'_> {
            Navigator {
                cache: &mut self.cache,
                filter: self.filter.as_ref(),
                search: None,
                is_help: false,
                total_lines: self.total,
                view: &mut self.view,
                geom,
                line_numbers: false,
                chop: false,
            }
        }
    }

    const GEOM: Geometry = Geometry {
        columns: 80,
        rows: 10,
    };

    #[test]
    fn forward_one_line_moves_the_top() {
        let mut fx = Fixture::new(&numbered_lines(30));
        assert_eq!(fx.nav(GEOM).move_forward(1).unwrap(), MoveOutcome::Moved);
        assert_eq!(fx.view.first_line_to_display, 1);
    }

    #[test]
    fn forward_stops_with_eof_signal_when_window_reaches_the_end() {
        // Three lines inside a ten-row window: the lookahead hits
        // end-of-stream, so the view refuses to scroll.
        let mut fx = Fixture::new("a\nb\nc\n");
        assert_eq!(
            fx.nav(GEOM).move_forward(1).unwrap(),
            MoveOutcome::EndOfStream
        );
        assert_eq!(fx.view.first_line_to_display, 0);
    }

    #[test]
    fn forward_then_backward_restores_the_position() {
        let mut fx = Fixture::new(&numbered_lines(40));
        fx.nav(GEOM).move_forward(7).unwrap();
        let mid = fx.view;
        fx.nav(GEOM).move_forward(5).unwrap();
        fx.nav(GEOM).move_backward(5).unwrap();
        assert_eq!(fx.view, mid);
    }

    #[test]
    fn end_jump_lands_on_the_last_window_and_signals_eof() {
        let mut fx = Fixture::new(&numbered_lines(40));
        assert_eq!(
            fx.nav(GEOM).move_forward(TO_END).unwrap(),
            MoveOutcome::EndOfStream
        );
        // rows - 1 displayable lines walked back from 40.
        assert_eq!(fx.view.first_line_to_display, 31);

        // A further forward step is a fixpoint that signals again.
        assert_eq!(
            fx.nav(GEOM).move_forward(1).unwrap(),
            MoveOutcome::EndOfStream
        );
        assert_eq!(fx.view.first_line_to_display, 31);
    }

    #[test]
    fn end_jump_without_total_steps_until_exhaustion() {
        let mut fx = Fixture::new(&numbered_lines(40));
        fx.total = None;
        assert_eq!(
            fx.nav(GEOM).move_forward(TO_END).unwrap(),
            MoveOutcome::EndOfStream
        );
        assert!(fx.view.first_line_to_display > 0);
    }

    #[test]
    fn backward_at_top_signals_begin_of_stream() {
        let mut fx = Fixture::new(&numbered_lines(5));
        assert_eq!(
            fx.nav(GEOM).move_backward(1).unwrap(),
            MoveOutcome::BeginOfStream
        );
    }

    #[test]
    fn wrap_mode_steps_through_a_long_line_by_screen_widths() {
        let narrow = Geometry {
            columns: 10,
            rows: 4,
        };
        // 25 columns wide: three segments under a 10-column screen.
        let long = "x".repeat(25);
        let content = format!("{long}\n{}", numbered_lines(20));
        let mut fx = Fixture::new(&content);

        fx.nav(narrow).move_forward(1).unwrap();
        assert_eq!(fx.view.first_line_to_display, 0);
        assert_eq!(fx.view.offset_in_line, 10);

        fx.nav(narrow).move_forward(1).unwrap();
        assert_eq!(fx.view.offset_in_line, 20);

        // Third step leaves the long line.
        fx.nav(narrow).move_forward(1).unwrap();
        assert_eq!(fx.view.first_line_to_display, 1);
        assert_eq!(fx.view.offset_in_line, 0);
    }

    #[test]
    fn backward_realigns_to_the_last_segment_of_a_long_line() {
        let narrow = Geometry {
            columns: 10,
            rows: 4,
        };
        let long = "x".repeat(25);
        let content = format!("{long}\n{}", numbered_lines(20));
        let mut fx = Fixture::new(&content);

        fx.nav(narrow).move_forward(3).unwrap();
        assert_eq!(fx.view.first_line_to_display, 1);

        fx.nav(narrow).move_backward(1).unwrap();
        assert_eq!(fx.view.first_line_to_display, 0);
        assert_eq!(fx.view.offset_in_line, 20);

        fx.nav(narrow).move_backward(1).unwrap();
        assert_eq!(fx.view.offset_in_line, 10);
    }

    #[test]
    fn exact_multiple_width_lands_on_the_final_full_segment() {
        assert_eq!(last_segment_start(20, 10), 10);
        assert_eq!(last_segment_start(25, 10), 20);
        assert_eq!(last_segment_start(7, 10), 0);
        assert_eq!(last_segment_start(0, 10), 0);
    }

    #[test]
    fn filter_restricts_navigation_to_matching_lines() {
        let mut fx = Fixture::new("abc\nfoobar\nbaz\n").with_filter("bar");
        let scan = next_displayable(&mut fx.cache, fx.filter.as_ref(), false, 0).unwrap();
        assert_eq!(scan.line, Some(1));

        let prev = prev_displayable(&mut fx.cache, fx.filter.as_ref(), false, 3, 0).unwrap();
        assert_eq!(prev, Some(1));
        // Nothing displayable below the match.
        let none = prev_displayable(&mut fx.cache, fx.filter.as_ref(), false, 1, 0).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn help_source_ignores_the_filter() {
        let mut fx = Fixture::new("abc\nxyz\n").with_filter("nomatch");
        let scan = next_displayable(&mut fx.cache, fx.filter.as_ref(), true, 0).unwrap();
        assert_eq!(scan.line, Some(0));
    }

    #[test]
    fn search_lands_on_first_match_after_the_top() {
        let mut fx = Fixture::new("abc\nfoobar\nbaz\nfoo\n");
        let pattern = CompiledPattern::compile("foo", CasePolicy::Sensitive).unwrap();
        let mut nav = fx.nav(GEOM);
        nav.search = Some(&pattern);
        assert_eq!(nav.move_to_next_match().unwrap(), MoveOutcome::Moved);
        assert_eq!(fx.view.first_line_to_display, 1);

        let mut nav = fx.nav(GEOM);
        nav.search = Some(&pattern);
        assert_eq!(nav.move_to_next_match().unwrap(), MoveOutcome::Moved);
        assert_eq!(fx.view.first_line_to_display, 3);

        // No further match.
        let mut nav = fx.nav(GEOM);
        nav.search = Some(&pattern);
        assert_eq!(
            nav.move_to_next_match().unwrap(),
            MoveOutcome::PatternNotFound
        );
        assert_eq!(fx.view.first_line_to_display, 3);
    }

    #[test]
    fn backward_search_respects_the_filter() {
        let mut fx = Fixture::new("foo one\nskip foo\nfoo two\n").with_filter("one|two");
        fx.view.first_line_to_display = 2;
        let pattern = CompiledPattern::compile("foo", CasePolicy::Sensitive).unwrap();
        let mut nav = fx.nav(GEOM);
        nav.search = Some(&pattern);
        // Line 1 matches the search but is filtered out; line 0 wins.
        assert_eq!(nav.move_to_previous_match().unwrap(), MoveOutcome::Moved);
        assert_eq!(fx.view.first_line_to_display, 0);
    }

    #[test]
    fn move_to_unreachable_line_reports_the_target() {
        let mut fx = Fixture::new("a\nb\n");
        assert_eq!(
            fx.nav(GEOM).move_to(10).unwrap(),
            MoveOutcome::Unreachable(10)
        );
        assert_eq!(fx.view.first_line_to_display, 0);

        assert_eq!(fx.nav(GEOM).move_to(1).unwrap(), MoveOutcome::Moved);
        assert_eq!(fx.view.first_line_to_display, 1);
    }
}
