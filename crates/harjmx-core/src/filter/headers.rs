use crate::har::{Entry, Header};

/// Headers reproduced by a JMeter Cache Manager
pub const CACHE_HEADERS: &[&str] = &[
    "cache-control",
    "pragma",
    "if-modified-since",
    "if-none-match",
    "if-unmodified-since",
    "if-match",
];

/// Strips headers from HAR entries before samplers are built
///
/// Names are compared case-insensitively and must match exactly. The
/// sanitizer never reorders the surviving headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderSanitizer {
    remove: Vec<String>,
    remove_cookie: bool,
    remove_cache: bool,
}

impl HeaderSanitizer {
    pub fn new<I, S>(remove_names: I, remove_cookie: bool, remove_cache: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            remove: remove_names
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            remove_cookie,
            remove_cache,
        }
    }

    /// Return a copy of the entry without the stripped headers
    pub fn sanitize(&self, entry: &Entry) -> Entry {
        let mut out = entry.clone();
        out.request.headers = self.retain(&entry.request.headers, "cookie");
        out.response.headers = self.retain(&entry.response.headers, "set-cookie");
        if self.remove_cookie {
            out.request.cookies.clear();
            out.response.cookies.clear();
        }
        out
    }

    /// Check whether a header name is stripped by this sanitizer
    ///
    /// `cookie_header` is the cookie header name for the side being checked
    /// (`cookie` on requests, `set-cookie` on responses).
    pub fn removes(&self, name: &str, cookie_header: &str) -> bool {
        let lower = name.to_lowercase();
        if self.remove.iter().any(|r| *r == lower) {
            return true;
        }
        if self.remove_cookie && lower == cookie_header {
            return true;
        }
        self.remove_cache && CACHE_HEADERS.contains(&lower.as_str())
    }

    fn retain(&self, headers: &[Header], cookie_header: &str) -> Vec<Header> {
        headers
            .iter()
            .filter(|h| !self.removes(&h.name, cookie_header))
            .cloned()
            .collect()
    }
}
