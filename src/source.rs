//! Source abstraction: named, ordered origins of bytes.
//!
//! A source knows its display name, can open a byte stream on demand, and may
//! know its total line count up front. Sources are opaque to the engine; the
//! registry (in [`registry`]) owns the ordered list and the currently open
//! stream.

pub mod registry;

use crate::error::{PagerError, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

pub use registry::SourceRegistry;

/// A named origin of bytes. Opening may fail with
/// [`PagerError::SourceNotFound`]; everything else about the stream is
/// opaque.
pub trait Source: Send {
    /// Display name shown in the status line and in messages.
    fn name(&self) -> &str;

    /// Open a fresh byte stream positioned at the start.
    fn open(&self) -> Result<Box<dyn Read + Send>>;

    /// Total line count when known ahead of time. Enables the fast path for
    /// end-of-stream jumps.
    fn total_lines(&self) -> Option<u64> {
        None
    }
}

/// A source backed by a file on disk.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }

    pub fn with_name(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        match File::open(&self.path) {
            Ok(file) => {
                if file.metadata()?.is_dir() {
                    return Err(PagerError::NotAFile {
                        path: self.path.clone(),
                    });
                }
                Ok(Box::new(file))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PagerError::source_not_found(&self.name))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// A source backed by in-memory text: the help screen, and test fixtures.
pub struct StaticSource {
    name: String,
    content: Cow<'static, str>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, content: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.content.as_bytes().to_vec())))
    }

    fn total_lines(&self) -> Option<u64> {
        Some(self.content.lines().count() as u64)
    }
}

/// Help screen text served by the synthetic source at index 0.
pub const HELP_TEXT: &str = "\
                   SUMMARY OF COMMANDS -- press q when done

  h  H                 Display this help.
  q  Q  :q  :Q  ZZ     Exit.

 MOVING
  e  ^E  j  ^N  CR     Forward  one line   (or N lines).
  y  ^Y  k  ^K  ^P     Backward one line   (or N lines).
  f  ^F  ^V  SPACE     Forward  one window (or N lines).
  b  ^B  ESC-v         Backward one window (or N lines).
  z                    Forward  one window (and set window to N).
  w                    Backward one window (and set window to N).
  d  ^D                Forward  one half-window (and set half-window to N).
  u  ^U                Backward one half-window (and set half-window to N).
  ESC-)  RightArrow    Right one half screen width.
  ESC-(  LeftArrow     Left  one half screen width.
  r  ^R  ^L            Repaint screen.
  R                    Repaint screen, discarding buffered input.

 SEARCHING
  /pattern             Search forward for (N-th) matching line.
  ?pattern             Search backward for (N-th) matching line.
  n                    Repeat previous search (for N-th occurrence).
  N                    Repeat previous search in reverse direction.
  ESC-u                Undo (toggle) search highlighting.
  &pattern             Display only matching lines.

 JUMPING
  g  <  ESC-<          Go to first line in file (or line N).
  G  >  ESC->          Go to last line in file (or line N).

 CHANGING FILES
  :e [file]            Examine a new file.
  :n                   Examine the (N-th) next file.
  :p                   Examine the (N-th) previous file.
  :x                   Examine the first (or N-th) file.
  :d                   Delete the current file from the list of files.
  =  ^G  :f            Print current file name and stats.
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn static_source_reports_line_count_and_content() {
        let src = StaticSource::new("three", "a\nb\nc\n");
        assert_eq!(src.total_lines(), Some(3));
        let mut buf = String::new();
        src.open().unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "a\nb\nc\n");
    }

    #[test]
    fn missing_file_maps_to_source_not_found() {
        let src = FileSource::with_name("/no/such/path/of/mine", "gone.txt");
        let err = src.open().err().expect("open should fail");
        match err {
            PagerError::SourceNotFound { name } => assert_eq!(name, "gone.txt"),
            other => panic!("expected SourceNotFound, got {other}"),
        }
    }
}
