//! Lazy line cache over the active source stream.
//!
//! Lines are decoded and appended on demand: `get_line(n)` pulls raw lines
//! from the stream until index `n` exists or the stream is exhausted. The
//! cache is monotonic and append-only for the lifetime of one open source;
//! switching or reopening a source replaces the whole cache. Memory is
//! bounded only by source size within one open lifetime, a deliberate
//! simplicity trade-off.

use crate::error::Result;
use crate::text::{StyledLine, TabStops};
use std::io::{BufRead, BufReader, Read};

pub struct LineCache {
    reader: BufReader<Box<dyn Read + Send>>,
    lines: Vec<StyledLine>,
    exhausted: bool,
    tabs: TabStops,
}

impl LineCache {
    pub fn new(stream: Box<dyn Read + Send>, tabs: TabStops) -> Self {
        Self {
            reader: BufReader::new(stream),
            lines: Vec::new(),
            exhausted: false,
            tabs,
        }
    }

    /// Look up line `n`, extending the cache from the stream as needed.
    /// Returns `None` for every index at or past the exhaustion point.
    pub fn get_line(&mut self, n: usize) -> Result<Option<&StyledLine>> {
        while n >= self.lines.len() && !self.exhausted {
            self.read_next()?;
        }
        Ok(self.lines.get(n))
    }

    /// Column width of line `n`, if it exists.
    pub fn line_width(&mut self, n: usize) -> Result<Option<usize>> {
        Ok(self.get_line(n)?.map(|line| line.width()))
    }

    /// Number of lines decoded so far. Grows monotonically.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True once the stream has reported end-of-stream.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn read_next(&mut self) -> Result<()> {
        let mut raw = Vec::new();
        let read = self.reader.read_until(b'\n', &mut raw)?;
        if read == 0 {
            self.exhausted = true;
            return Ok(());
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }
        let decoded = String::from_utf8_lossy(&raw);
        self.lines.push(StyledLine::from_ansi(&decoded, &self.tabs));
        Ok(())
    }
}
