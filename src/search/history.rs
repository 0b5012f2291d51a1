//! Pattern history with a browse cursor.
//!
//! Committed non-empty patterns accumulate oldest-first. Browsing starts at
//! the newest entry and walks toward the oldest; stepping past the oldest
//! clamps, and stepping back past the newest restores the exact buffer
//! contents captured when browsing began.

/// Result of a downward browse step.
#[derive(Debug, PartialEq, Eq)]
pub enum BrowseOutcome {
    /// A younger history entry.
    Entry(String),
    /// Browsing left the valid range; the pre-browse buffer comes back.
    Restored(String),
}

#[derive(Debug, Default)]
pub struct PatternHistory {
    entries: Vec<String>,
    /// Steps back from the newest entry; `None` when not browsing.
    cursor: Option<usize>,
    stash: String,
}

impl PatternHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed pattern unless it is empty or already the most
    /// recent entry.
    pub fn push(&mut self, raw: &str) {
        if raw.is_empty() || self.entries.last().map(String::as_str) == Some(raw) {
            return;
        }
        self.entries.push(raw.to_string());
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Step toward older entries. The first step stashes `current` so it can
    /// be restored later; stepping past the oldest entry clamps.
    pub fn browse_up(&mut self, current: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => {
                self.stash = current.to_string();
                0
            }
            Some(k) => (k + 1).min(self.entries.len() - 1),
        };
        self.cursor = Some(next);
        self.entries.get(self.entries.len() - 1 - next).map(String::as_str)
    }

    /// Step toward newer entries; leaving the valid range restores the
    /// stashed buffer and ends browsing.
    pub fn browse_down(&mut self) -> Option<BrowseOutcome> {
        match self.cursor? {
            0 => {
                self.cursor = None;
                Some(BrowseOutcome::Restored(std::mem::take(&mut self.stash)))
            }
            k => {
                self.cursor = Some(k - 1);
                self.entries
                    .get(self.entries.len() - k)
                    .map(|entry| BrowseOutcome::Entry(entry.clone()))
            }
        }
    }

    /// Forget the browse cursor and stash (called on every commit).
    pub fn reset_browse(&mut self) {
        self.cursor = None;
        self.stash.clear();
    }
}
