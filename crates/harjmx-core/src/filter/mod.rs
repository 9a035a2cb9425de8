mod headers;

pub use headers::{CACHE_HEADERS, HeaderSanitizer};

use crate::har::Entry;
use regex::Regex;

/// URL include/exclude filter for HAR entries
///
/// The include pattern is evaluated first; the exclude pattern then removes
/// entries from the included set. An absent pattern never filters anything.
/// Both patterns use search semantics: they match anywhere in the URL
/// unless anchored.
#[derive(Debug, Default, Clone)]
pub struct UrlFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl UrlFilter {
    /// Compile the include and exclude patterns
    ///
    /// Blank patterns are treated as absent.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> crate::Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Check if an entry's URL passes the filter
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_url(&entry.request.url)
    }

    pub fn matches_url(&self, url: &str) -> bool {
        if let Some(include) = &self.include
            && !include.is_match(url)
        {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(url),
            None => true,
        }
    }

    /// Keep only the entries that pass the filter, preserving order
    pub fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        let before = entries.len();
        let kept: Vec<Entry> = entries.into_iter().filter(|e| self.matches(e)).collect();

        tracing::debug!("URL filter kept {} of {} entries", kept.len(), before);
        kept
    }

    pub fn is_noop(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

fn compile(pattern: Option<&str>) -> crate::Result<Option<Regex>> {
    match pattern.filter(|p| !p.trim().is_empty()) {
        None => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|source| crate::Error::InvalidFilterPattern {
                pattern: p.to_string(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_patterns_match_everything() {
        let filter = UrlFilter::new(None, Some("  ")).unwrap();
        assert!(filter.is_noop());
        assert!(filter.matches_url("https://example.com/a.png"));
    }

    #[test]
    fn test_include_only() {
        let filter = UrlFilter::new(Some(r".*\.json$"), None).unwrap();
        assert!(filter.matches_url("https://example.com/a.json"));
        assert!(!filter.matches_url("https://example.com/a.png"));
    }

    #[test]
    fn test_exclude_applies_after_include() {
        let filter = UrlFilter::new(Some("example\\.com"), Some(r"\.(png|css|js)(\?|$)")).unwrap();
        assert!(filter.matches_url("https://example.com/api/users"));
        assert!(!filter.matches_url("https://example.com/logo.png"));
        assert!(!filter.matches_url("https://example.com/app.js?v=3"));
        assert!(!filter.matches_url("https://cdn.other.net/api/users"));
    }

    #[test]
    fn test_unanchored_pattern_matches_substring() {
        let filter = UrlFilter::new(Some("/api/"), None).unwrap();
        assert!(filter.matches_url("https://example.com/api/v1/items"));
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let err = UrlFilter::new(Some("("), None).unwrap_err();
        match err {
            crate::Error::InvalidFilterPattern { pattern, .. } => assert_eq!(pattern, "("),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(UrlFilter::new(None, Some("[z-a]")).is_err());
    }
}
