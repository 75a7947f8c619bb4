// src/models/pattern.rs

//! Regular expressions used to select entries by description.

use regex::Regex;

use crate::error::{AppError, Result};

/// Pattern that matches everything; used when a level is not filtered.
pub const MATCH_ANY: &str = ".*";

/// A regex that matches from the start of the text, not necessarily to its end.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})"))
            .map_err(|e| AppError::pattern(source, e))?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Pattern accepting any description.
    pub fn any() -> Self {
        Self::new(MATCH_ANY).expect("match-any pattern is valid")
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::any()
    }
}

/// One pattern per hierarchy level.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub projects: Pattern,
    pub distributions: Pattern,
    pub versions: Pattern,
    pub files: Pattern,
}

impl FilterSet {
    /// Compile a filter set; `None` leaves a level unfiltered.
    pub fn new(
        projects: Option<&str>,
        distributions: Option<&str>,
        versions: Option<&str>,
        files: Option<&str>,
    ) -> Result<Self> {
        let compile = |source: Option<&str>| source.map_or_else(|| Ok(Pattern::any()), Pattern::new);

        Ok(Self {
            projects: compile(projects)?,
            distributions: compile(distributions)?,
            versions: compile(versions)?,
            files: compile(files)?,
        })
    }

    /// Filter on file descriptions only.
    pub fn files(pattern: &str) -> Result<Self> {
        Self::new(None, None, None, Some(pattern))
    }

    /// Patterns applied below the project level, outermost first.
    pub fn below_projects(&self) -> [Pattern; 3] {
        [
            self.distributions.clone(),
            self.versions.clone(),
            self.files.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_from_start_only() {
        let pattern = Pattern::new("readme").unwrap();
        assert!(pattern.is_match("readme.txt"));
        assert!(!pattern.is_match("old-readme.txt"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let pattern = Pattern::new("a|b").unwrap();
        assert!(pattern.is_match("b-side"));
        assert!(!pattern.is_match("xb"));
    }

    #[test]
    fn test_any_matches_empty() {
        assert!(Pattern::any().is_match(""));
        assert!(Pattern::any().is_match("anything"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new("([").unwrap_err();
        assert!(matches!(err, AppError::Pattern { ref pattern, .. } if pattern == "(["));
    }

    #[test]
    fn test_filter_set_defaults() {
        let filters = FilterSet::files("^v1").unwrap();
        assert_eq!(filters.projects.as_str(), MATCH_ANY);
        assert_eq!(filters.files.as_str(), "^v1");
        assert!(filters.files.is_match("v1.zip"));
    }
}
