//! Styled line values.
//!
//! Raw source bytes carry tabs and embedded SGR escape sequences. Decoding
//! turns them into a [`StyledLine`]: a run of styled spans measured in
//! display columns, sliceable by column range (for chop/pan and wrap) and
//! highlightable by byte range (for search matches). Column widths come from
//! `unicode-width`, so CJK and other wide characters pan and wrap correctly.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Tab stop configuration. A single entry is a repeating interval; multiple
/// entries are explicit stops, extended past the last one by the final
/// interval.
#[derive(Debug, Clone)]
pub struct TabStops(Vec<usize>);

impl Default for TabStops {
    fn default() -> Self {
        Self(vec![4])
    }
}

impl TabStops {
    pub fn new(stops: Vec<usize>) -> Self {
        if stops.is_empty() {
            Self::default()
        } else {
            Self(stops)
        }
    }

    /// Column of the next tab stop strictly after `col`.
    pub fn next_stop(&self, col: usize) -> usize {
        if self.0.len() == 1 {
            let interval = self.0[0].max(1);
            (col / interval + 1) * interval
        } else {
            if let Some(stop) = self.0.iter().copied().find(|&s| s > col) {
                return stop;
            }
            let last = self.0[self.0.len() - 1];
            let prev = self.0[self.0.len() - 2];
            let interval = last.saturating_sub(prev).max(1);
            let past = col - last;
            last + (past / interval + 1) * interval
        }
    }
}

/// One styled run of text.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    style: Style,
}

/// A decoded source line: plain text plus styled runs, measured in columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledLine {
    runs: Vec<Run>,
    plain: String,
    width: usize,
}

impl StyledLine {
    /// Decode raw line content: expand tabs against `tabs` and interpret SGR
    /// escape sequences into styles. Unknown escape sequences are dropped.
    pub fn from_ansi(raw: &str, tabs: &TabStops) -> Self {
        let mut line = StyledLine::default();
        let mut style = Style::default();
        let mut current = String::new();
        let mut col = 0usize;

        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\x1b' => {
                    match chars.peek() {
                        Some('[') => {
                            chars.next();
                            let mut params = String::new();
                            let mut terminator = None;
                            for c in chars.by_ref() {
                                if ('\x40'..='\x7e').contains(&c) {
                                    terminator = Some(c);
                                    break;
                                }
                                params.push(c);
                            }
                            if terminator == Some('m') {
                                line.flush(&mut current, style);
                                style = apply_sgr(style, &params);
                            }
                        }
                        // Lone or two-byte escapes carry no width; skip the
                        // introducer byte.
                        Some(_) => {
                            chars.next();
                        }
                        None => {}
                    }
                }
                '\t' => {
                    let stop = tabs.next_stop(col);
                    while col < stop {
                        current.push(' ');
                        col += 1;
                    }
                }
                _ => {
                    let w = ch.width().unwrap_or(0);
                    current.push(ch);
                    col += w;
                }
            }
        }
        line.flush(&mut current, style);
        line.width = col;
        line
    }

    /// A line of already-plain text with default styling.
    pub fn from_plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let width = text.chars().map(|c| c.width().unwrap_or(0)).sum();
        let plain = text.clone();
        StyledLine {
            runs: vec![Run {
                text,
                style: Style::default(),
            }],
            plain,
            width,
        }
    }

    fn flush(&mut self, current: &mut String, style: Style) {
        if current.is_empty() {
            return;
        }
        self.plain.push_str(current);
        self.runs.push(Run {
            text: std::mem::take(current),
            style,
        });
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty()
    }

    /// Plain text with escapes removed and tabs expanded; the haystack for
    /// search and filter matching.
    pub fn text(&self) -> &str {
        &self.plain
    }

    /// Slice by display columns `[start, end)`. A wide character straddling
    /// either boundary is excluded.
    pub fn column_sub(&self, start: usize, end: usize) -> StyledLine {
        let mut out = StyledLine::default();
        let mut col = 0usize;
        for run in &self.runs {
            let mut kept = String::new();
            for ch in run.text.chars() {
                let w = ch.width().unwrap_or(0);
                if col >= start && col + w <= end {
                    kept.push(ch);
                    out.width += w;
                }
                col += w;
            }
            if !kept.is_empty() {
                out.plain.push_str(&kept);
                out.runs.push(Run {
                    text: kept,
                    style: run.style,
                });
            }
            if col >= end {
                break;
            }
        }
        out
    }

    /// Split for wrap mode: the first `width` columns and the remainder.
    pub fn split_at_column(&self, width: usize) -> (StyledLine, StyledLine) {
        (
            self.column_sub(0, width),
            self.column_sub(width, usize::MAX),
        )
    }

    /// Re-style the byte ranges of `ranges` (offsets into [`Self::text`]),
    /// patching the given style over the existing one. Used to show search
    /// matches inverse.
    pub fn style_ranges(&self, ranges: &[(usize, usize)], patch: Style) -> StyledLine {
        if ranges.is_empty() {
            return self.clone();
        }
        let mut out = StyledLine {
            runs: Vec::new(),
            plain: self.plain.clone(),
            width: self.width,
        };
        let mut offset = 0usize;
        for run in &self.runs {
            let mut piece = String::new();
            let mut piece_hl = run
                .text
                .chars()
                .next()
                .map(|c| in_ranges(offset, c.len_utf8(), ranges))
                .unwrap_or(false);
            for ch in run.text.chars() {
                let hl = in_ranges(offset, ch.len_utf8(), ranges);
                if hl != piece_hl && !piece.is_empty() {
                    out.push_run(std::mem::take(&mut piece), run.style, piece_hl, patch);
                }
                piece_hl = hl;
                piece.push(ch);
                offset += ch.len_utf8();
            }
            if !piece.is_empty() {
                out.push_run(piece, run.style, piece_hl, patch);
            }
        }
        out
    }

    fn push_run(&mut self, text: String, base: Style, highlighted: bool, patch: Style) {
        let style = if highlighted { base.patch(patch) } else { base };
        self.runs.push(Run { text, style });
    }

    /// Prepend a plain prefix (used for line numbers).
    pub fn with_prefix(&self, prefix: &str) -> StyledLine {
        let mut out = StyledLine::from_plain(prefix);
        out.plain.push_str(&self.plain);
        out.width += self.width;
        out.runs.extend(self.runs.iter().cloned());
        out
    }

    /// Convert into a ratatui line for painting.
    pub fn to_line(&self) -> Line<'static> {
        Line::from(
            self.runs
                .iter()
                .map(|run| Span::styled(run.text.clone(), run.style))
                .collect::<Vec<_>>(),
        )
    }
}

fn in_ranges(offset: usize, len: usize, ranges: &[(usize, usize)]) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| offset >= start && offset + len <= end)
}

/// The inverse-video style applied to search matches.
pub fn match_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
    let codes: Vec<u16> = params
        .split(';')
        .map(|p| p.parse().unwrap_or(0))
        .collect();
    let codes = if codes.is_empty() { vec![0] } else { codes };

    let mut iter = codes.into_iter();
    while let Some(code) = iter.next() {
        style = match code {
            0 => Style::default(),
            1 => style.add_modifier(Modifier::BOLD),
            3 => style.add_modifier(Modifier::ITALIC),
            4 => style.add_modifier(Modifier::UNDERLINED),
            7 => style.add_modifier(Modifier::REVERSED),
            22 => style.remove_modifier(Modifier::BOLD),
            23 => style.remove_modifier(Modifier::ITALIC),
            24 => style.remove_modifier(Modifier::UNDERLINED),
            27 => style.remove_modifier(Modifier::REVERSED),
            30..=37 => style.fg(indexed_color(code - 30)),
            39 => style.fg(Color::Reset),
            40..=47 => style.bg(indexed_color(code - 40)),
            49 => style.bg(Color::Reset),
            90..=97 => style.fg(indexed_color(code - 90 + 8)),
            100..=107 => style.bg(indexed_color(code - 100 + 8)),
            38 | 48 => {
                let color = match iter.next() {
                    Some(5) => iter.next().map(|n| Color::Indexed(n as u8)),
                    Some(2) => {
                        let (r, g, b) = (iter.next(), iter.next(), iter.next());
                        match (r, g, b) {
                            (Some(r), Some(g), Some(b)) => {
                                Some(Color::Rgb(r as u8, g as u8, b as u8))
                            }
                            _ => None,
                        }
                    }
                    _ => None,
                };
                match (code, color) {
                    (38, Some(c)) => style.fg(c),
                    (48, Some(c)) => style.bg(c),
                    _ => style,
                }
            }
            _ => style,
        };
    }
    style
}

fn indexed_color(n: u16) -> Color {
    match n {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::Gray,
        8 => Color::DarkGray,
        9 => Color::LightRed,
        10 => Color::LightGreen,
        11 => Color::LightYellow,
        12 => Color::LightBlue,
        13 => Color::LightMagenta,
        14 => Color::LightCyan,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_expansion_uses_interval() {
        let line = StyledLine::from_ansi("a\tb", &TabStops::default());
        assert_eq!(line.text(), "a   b");
        assert_eq!(line.width(), 5);
    }

    #[test]
    fn explicit_tab_stops_extend_by_last_interval() {
        let tabs = TabStops::new(vec![2, 6]);
        assert_eq!(tabs.next_stop(0), 2);
        assert_eq!(tabs.next_stop(3), 6);
        // Past the last stop the 4-column interval repeats.
        assert_eq!(tabs.next_stop(6), 10);
        assert_eq!(tabs.next_stop(11), 14);
    }

    #[test]
    fn sgr_sequences_become_styles_and_leave_plain_text() {
        let line = StyledLine::from_ansi("\x1b[1;31mred\x1b[0m plain", &TabStops::default());
        assert_eq!(line.text(), "red plain");
        assert_eq!(line.runs.len(), 2);
        assert_eq!(line.runs[0].style.fg, Some(Color::Red));
        assert!(line.runs[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.runs[1].style, Style::default());
    }

    #[test]
    fn column_sub_slices_by_display_width() {
        let line = StyledLine::from_plain("abcdef");
        assert_eq!(line.column_sub(1, 4).text(), "bcd");
        assert_eq!(line.column_sub(4, usize::MAX).text(), "ef");
        assert_eq!(line.column_sub(10, 20).text(), "");
    }

    #[test]
    fn wide_chars_straddling_a_boundary_are_excluded() {
        // "日" is two columns wide.
        let line = StyledLine::from_plain("a日b");
        assert_eq!(line.width(), 4);
        // Slicing through the middle of the wide char drops it.
        assert_eq!(line.column_sub(0, 2).text(), "a");
        assert_eq!(line.column_sub(2, 4).text(), "b");
    }

    #[test]
    fn style_ranges_splits_runs_around_matches() {
        let line = StyledLine::from_plain("foobarfoo");
        let styled = line.style_ranges(&[(0, 3), (6, 9)], match_style());
        assert_eq!(styled.text(), "foobarfoo");
        let texts: Vec<&str> = styled.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["foo", "bar", "foo"]);
        assert!(styled.runs[0]
            .style
            .add_modifier
            .contains(Modifier::REVERSED));
        assert!(!styled.runs[1]
            .style
            .add_modifier
            .contains(Modifier::REVERSED));
    }

    #[test]
    fn prefix_extends_width_and_text() {
        let line = StyledLine::from_plain("body").with_prefix("      7 ");
        assert_eq!(line.text(), "      7 body");
        assert_eq!(line.width(), 12);
    }
}
