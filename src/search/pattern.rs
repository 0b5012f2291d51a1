//! Pattern compilation and per-line matching.

use crate::error::{PagerError, Result};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

/// When searches ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CasePolicy {
    /// Case is always significant.
    #[default]
    Sensitive,
    /// Ignore case unless the pattern contains an uppercase character.
    Smart,
    /// Always ignore case.
    Insensitive,
}

impl CasePolicy {
    fn insensitive_for(self, raw: &str) -> bool {
        match self {
            CasePolicy::Sensitive => false,
            CasePolicy::Insensitive => true,
            CasePolicy::Smart => !raw.chars().any(|c| c.is_uppercase()),
        }
    }
}

/// A compiled search or filter pattern, kept alongside its raw text so it can
/// be recompiled when the case policy flips.
#[derive(Debug)]
pub struct CompiledPattern {
    raw: String,
    matcher: RegexMatcher,
}

impl CompiledPattern {
    /// Compile `raw` under `policy`. A malformed pattern yields
    /// [`PagerError::Pattern`] carrying a single-line diagnostic.
    pub fn compile(raw: &str, policy: CasePolicy) -> Result<Self> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(policy.insensitive_for(raw))
            .build(raw)
            .map_err(|err| PagerError::pattern(err.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            matcher,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text.as_bytes()).unwrap_or(false)
    }

    /// Byte ranges of every match within `text`, for highlighting.
    pub fn match_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let _ = self.matcher.find_iter(text.as_bytes(), |m| {
            ranges.push((m.start(), m.end()));
            true
        });
        ranges
    }
}

/// Active search and filter patterns plus the case policy. The two patterns
/// are independent: clearing or replacing one leaves the other untouched.
#[derive(Debug, Default)]
pub struct PatternState {
    search: Option<CompiledPattern>,
    filter: Option<CompiledPattern>,
    policy: CasePolicy,
}

impl PatternState {
    pub fn with_policy(policy: CasePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> CasePolicy {
        self.policy
    }

    pub fn search(&self) -> Option<&CompiledPattern> {
        self.search.as_ref()
    }

    pub fn filter(&self) -> Option<&CompiledPattern> {
        self.filter.as_ref()
    }

    pub fn set_search(&mut self, raw: &str) -> Result<()> {
        self.search = Some(CompiledPattern::compile(raw, self.policy)?);
        Ok(())
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    /// Set or clear the filter; an empty raw pattern clears it.
    pub fn set_filter(&mut self, raw: &str) -> Result<()> {
        self.filter = if raw.is_empty() {
            None
        } else {
            Some(CompiledPattern::compile(raw, self.policy)?)
        };
        Ok(())
    }

    /// Change the case policy, recompiling both active patterns under it.
    pub fn set_policy(&mut self, policy: CasePolicy) -> Result<()> {
        self.policy = policy;
        if let Some(search) = self.search.take() {
            self.search = Some(CompiledPattern::compile(search.raw(), policy)?);
        }
        if let Some(filter) = self.filter.take() {
            self.filter = Some(CompiledPattern::compile(filter.raw(), policy)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_policy_respects_case() {
        let pat = CompiledPattern::compile("foo", CasePolicy::Sensitive).unwrap();
        assert!(pat.is_match("foobar"));
        assert!(!pat.is_match("FOOBAR"));
    }

    #[test]
    fn insensitive_policy_matches_any_case() {
        let pat = CompiledPattern::compile("FOO", CasePolicy::Insensitive).unwrap();
        assert!(pat.is_match("foobar"));
    }

    #[test]
    fn smart_case_only_ignores_case_for_lowercase_patterns() {
        let lower = CompiledPattern::compile("foo", CasePolicy::Smart).unwrap();
        assert!(lower.is_match("FOObar"));

        let mixed = CompiledPattern::compile("Foo", CasePolicy::Smart).unwrap();
        assert!(mixed.is_match("Foobar"));
        assert!(!mixed.is_match("foobar"));
    }

    #[test]
    fn malformed_pattern_yields_single_line_diagnostic() {
        let err = CompiledPattern::compile("(unclosed", CasePolicy::Sensitive).unwrap_err();
        match err {
            PagerError::Pattern { message } => assert!(!message.contains('\n')),
            other => panic!("expected Pattern error, got {other}"),
        }
    }

    #[test]
    fn match_ranges_cover_every_occurrence() {
        let pat = CompiledPattern::compile("ab", CasePolicy::Sensitive).unwrap();
        assert_eq!(pat.match_ranges("ab-ab-ab"), vec![(0, 2), (3, 5), (6, 8)]);
        assert!(pat.match_ranges("xyz").is_empty());
    }

    #[test]
    fn policy_change_recompiles_active_patterns() {
        let mut state = PatternState::default();
        state.set_search("FOO").unwrap();
        assert!(!state.search().unwrap().is_match("foobar"));

        state.set_policy(CasePolicy::Insensitive).unwrap();
        assert!(state.search().unwrap().is_match("foobar"));
    }

    #[test]
    fn empty_filter_commit_clears_the_filter() {
        let mut state = PatternState::default();
        state.set_filter("bar").unwrap();
        assert!(state.filter().is_some());
        state.set_filter("").unwrap();
        assert!(state.filter().is_none());
    }
}
