//! Ordered source list plus the currently active stream.
//!
//! The registry owns the open stream and the line cache for the active
//! source. Opening a missing source after the first falls back to the
//! previous one; only a session that cannot open anything at all fails
//! fatally. Index 0 is the synthetic help source and is excluded from
//! "file X of N" counting.

use crate::cache::LineCache;
use crate::cancel::{CancelToken, InterruptibleReader};
use crate::error::{PagerError, Result};
use crate::source::{FileSource, Source, StaticSource, HELP_TEXT};
use crate::text::TabStops;
use std::path::PathBuf;

pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
    index: usize,
    cache: Option<LineCache>,
    tabs: TabStops,
    working_dir: PathBuf,
    cancel: CancelToken,
}

impl SourceRegistry {
    /// Build a registry over the given sources, prepending the help source at
    /// index 0 and selecting the first real source.
    pub fn new(
        sources: Vec<Box<dyn Source>>,
        working_dir: PathBuf,
        tabs: TabStops,
        cancel: CancelToken,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(PagerError::NoSources);
        }
        let mut all: Vec<Box<dyn Source>> = Vec::with_capacity(sources.len() + 1);
        all.push(Box::new(StaticSource::new(
            "HELP -- Press SPACE for more, or q when done",
            HELP_TEXT,
        )));
        all.extend(sources);
        Ok(Self {
            sources: all,
            index: 1,
            cache: None,
            tabs,
            working_dir,
            cancel,
        })
    }

    /// Index of the active source (0 = help).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move the active index without opening. Navigation bounds are the
    /// caller's business; rollback relies on this being a plain assignment.
    pub fn set_index(&mut self, index: usize) {
        debug_assert!(index < self.sources.len());
        self.index = index;
    }

    /// Total entries including the help source.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of real (non-help) sources.
    pub fn real_count(&self) -> usize {
        self.sources.len().saturating_sub(1)
    }

    pub fn is_help_active(&self) -> bool {
        self.index == 0
    }

    pub fn active_name(&self) -> &str {
        self.sources[self.index].name()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.sources.get(index).map(|s| s.name())
    }

    /// Known total line count of the active source, if any.
    pub fn active_total_lines(&self) -> Option<u64> {
        self.sources[self.index].total_lines()
    }

    /// The line cache of the open source. `None` until `open_active`
    /// succeeds.
    pub fn cache_mut(&mut self) -> Option<&mut LineCache> {
        self.cache.as_mut()
    }

    /// Open the active source, closing any previous stream and resetting the
    /// cache. When the source is missing or not a regular file it is removed
    /// and the previous one retried; if a stream was already open the error
    /// propagates instead so the caller can roll back a navigation attempt.
    /// Returns the transient status message for the newly opened source.
    pub fn open_active(&mut self) -> Result<String> {
        let was_open = self.cache.take().is_some();
        let mut fallback_note: Option<String> = None;

        loop {
            let name = self.sources[self.index].name().to_string();
            match self.sources[self.index].open() {
                Ok(stream) => {
                    log::debug!("opened source {name:?} at index {}", self.index);
                    let message = if self.sources.len() == 2 || self.index == 0 {
                        name
                    } else {
                        format!("{} (file {} of {})", name, self.index, self.sources.len() - 1)
                    };
                    let reader = InterruptibleReader::new(stream, self.cancel.clone());
                    self.cache = Some(LineCache::new(Box::new(reader), self.tabs.clone()));
                    return Ok(fallback_note.unwrap_or(message));
                }
                Err(err @ (PagerError::SourceNotFound { .. } | PagerError::NotAFile { .. })) => {
                    log::debug!("source {name:?} unopenable, falling back");
                    self.sources.remove(self.index);
                    if self.index > self.sources.len().saturating_sub(1) {
                        self.index = self.sources.len() - 1;
                    }
                    if was_open || self.index == 0 {
                        return Err(err);
                    }
                    fallback_note = Some(format!("{name} not found!"));
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Append sources for `spec` and make the last one active. A spec with
    /// `*` or `?` expands as a glob against the working directory, appending
    /// one source per match in walk order; anything else appends a single
    /// file source resolved against the working directory.
    pub fn add_source(&mut self, spec: &str) -> Result<()> {
        if spec.contains('*') || spec.contains('?') {
            let pattern = self.working_dir.join(spec);
            let pattern = pattern.to_string_lossy();
            let matches =
                glob::glob(&pattern).map_err(|err| PagerError::pattern(err.to_string()))?;
            for entry in matches {
                let path = entry.map_err(|err| PagerError::Io(err.into_error()))?;
                self.sources.push(Box::new(FileSource::new(path)));
            }
        } else {
            let path = self.working_dir.join(spec);
            self.sources
                .push(Box::new(FileSource::with_name(path, spec)));
        }
        self.index = self.sources.len() - 1;
        Ok(())
    }

    /// Remove the active source and reopen at the clamped index. A no-op
    /// unless more than one real source remains.
    pub fn delete_active(&mut self) -> Result<Option<String>> {
        if self.sources.len() <= 2 {
            return Ok(None);
        }
        self.sources.remove(self.index);
        if self.index >= self.sources.len() {
            self.index = self.sources.len() - 1;
        }
        self.open_active().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn static_src(name: &str, content: &'static str) -> Box<dyn Source> {
        Box::new(StaticSource::new(name, content))
    }

    fn missing_src(name: &str) -> Box<dyn Source> {
        Box::new(FileSource::with_name("/definitely/not/here", name))
    }

    fn registry(sources: Vec<Box<dyn Source>>) -> SourceRegistry {
        SourceRegistry::new(
            sources,
            PathBuf::from("."),
            TabStops::default(),
            CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn open_resets_cache_and_formats_file_of_n_message() {
        let mut reg = registry(vec![
            static_src("a.txt", "alpha\n"),
            static_src("b.txt", "beta\n"),
        ]);
        let msg = reg.open_active().unwrap();
        assert_eq!(msg, "a.txt (file 1 of 2)");
        assert_eq!(
            reg.cache_mut().unwrap().get_line(0).unwrap().unwrap().text(),
            "alpha"
        );

        reg.set_index(2);
        let msg = reg.open_active().unwrap();
        assert_eq!(msg, "b.txt (file 2 of 2)");
        // Fresh cache for the new source.
        assert_eq!(reg.cache_mut().unwrap().len(), 0);
    }

    #[test]
    fn single_real_source_message_is_just_the_name() {
        let mut reg = registry(vec![static_src("only.txt", "x\n")]);
        assert_eq!(reg.open_active().unwrap(), "only.txt");
    }

    #[test]
    fn missing_first_source_falls_back_with_note() {
        let mut reg = registry(vec![missing_src("gone.txt"), static_src("b.txt", "beta\n")]);
        // Activate the missing one first.
        reg.set_index(1);
        let msg = reg.open_active().unwrap();
        assert_eq!(msg, "gone.txt not found!");
        // The missing source was dropped from the list.
        assert_eq!(reg.real_count(), 1);
        assert_eq!(reg.active_name(), "b.txt");
    }

    #[test]
    fn missing_source_with_open_stream_propagates_for_rollback() {
        let mut reg = registry(vec![static_src("a.txt", "alpha\n"), missing_src("gone.txt")]);
        reg.open_active().unwrap();
        reg.set_index(2);
        let err = reg.open_active().unwrap_err();
        assert!(matches!(err, PagerError::SourceNotFound { .. }));
        // The failing source is removed; the caller restores index and reopens.
        assert_eq!(reg.real_count(), 1);
    }

    #[test]
    fn nothing_openable_is_fatal() {
        let mut reg = registry(vec![missing_src("gone.txt")]);
        assert!(reg.open_active().is_err());
    }

    #[test]
    fn delete_requires_more_than_one_real_source() {
        let mut reg = registry(vec![static_src("only.txt", "x\n")]);
        reg.open_active().unwrap();
        assert!(reg.delete_active().unwrap().is_none());
        assert_eq!(reg.real_count(), 1);

        let mut reg = registry(vec![
            static_src("a.txt", "alpha\n"),
            static_src("b.txt", "beta\n"),
        ]);
        reg.open_active().unwrap();
        let msg = reg.delete_active().unwrap();
        assert_eq!(msg.as_deref(), Some("b.txt"));
        assert_eq!(reg.real_count(), 1);
    }

    #[test]
    fn add_source_with_glob_appends_matches_in_walk_order() {
        let dir = TempDir::new().unwrap();
        for name in ["one.log", "two.log", "skip.txt"] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(f, "{name}").unwrap();
        }
        let mut reg = SourceRegistry::new(
            vec![static_src("seed.txt", "seed\n")],
            dir.path().to_path_buf(),
            TabStops::default(),
            CancelToken::new(),
        )
        .unwrap();

        reg.add_source("*.log").unwrap();
        assert_eq!(reg.real_count(), 3);
        // The newly added source is active.
        assert_eq!(reg.index(), reg.source_count() - 1);

        reg.add_source("extra.txt").unwrap();
        assert_eq!(reg.active_name(), "extra.txt");
    }
}
