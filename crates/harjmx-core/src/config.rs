//! Conversion configuration.
//!
//! A [`ConversionConfig`] is built once per conversion and never mutated
//! afterwards. Front ends that collect numeric options as free text should
//! run them through the `lenient_*` helpers, which log and fall back to the
//! documented default instead of failing.

use crate::har::DEFAULT_MAX_STRING_SIZE;
use std::path::{Path, PathBuf};

/// Default gap (ms) between two requests that starts a new page
pub const DEFAULT_PAUSE_THRESHOLD_MS: i64 = 5000;

/// Immutable snapshot of every conversion parameter
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub har_path: PathBuf,
    pub jmx_path: PathBuf,
    pub recording_path: Option<PathBuf>,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub headers_to_remove: Vec<String>,
    pub pause_threshold_ms: i64,
    pub add_pause: bool,
    pub page_start: u32,
    pub sampler_start: u32,
    pub max_string_size: usize,
    pub remove_cookie: bool,
    pub remove_cache_headers: bool,
    pub add_result_tree: bool,
    pub websocket_enabled: bool,
    pub use_har_pages: bool,
    pub metadata_path: Option<PathBuf>,
}

impl ConversionConfig {
    pub fn builder(har_path: impl Into<PathBuf>) -> ConversionConfigBuilder {
        ConversionConfigBuilder::new(har_path.into())
    }
}

/// Builder for [`ConversionConfig`]
///
/// Defaults match the interactive tool: pauses, cookie and cache header
/// removal and the result tree listener are on, WebSocket samplers are off.
#[derive(Debug, Clone)]
pub struct ConversionConfigBuilder {
    har_path: PathBuf,
    jmx_path: Option<PathBuf>,
    recording_path: Option<PathBuf>,
    include_pattern: Option<String>,
    exclude_pattern: Option<String>,
    headers_to_remove: Vec<String>,
    pause_threshold_ms: i64,
    add_pause: bool,
    page_start: u32,
    sampler_start: u32,
    max_string_size: usize,
    remove_cookie: bool,
    remove_cache_headers: bool,
    add_result_tree: bool,
    websocket_enabled: bool,
    use_har_pages: bool,
    metadata_path: Option<PathBuf>,
}

impl ConversionConfigBuilder {
    fn new(har_path: PathBuf) -> Self {
        Self {
            har_path,
            jmx_path: None,
            recording_path: None,
            include_pattern: None,
            exclude_pattern: None,
            headers_to_remove: Vec::new(),
            pause_threshold_ms: DEFAULT_PAUSE_THRESHOLD_MS,
            add_pause: true,
            page_start: 1,
            sampler_start: 1,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            remove_cookie: true,
            remove_cache_headers: true,
            add_result_tree: true,
            websocket_enabled: false,
            use_har_pages: true,
            metadata_path: None,
        }
    }

    pub fn jmx_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.jmx_path = Some(path.into());
        self
    }

    pub fn recording_path(mut self, path: Option<PathBuf>) -> Self {
        self.recording_path = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn include_pattern(mut self, pattern: Option<String>) -> Self {
        self.include_pattern = non_blank(pattern);
        self
    }

    pub fn exclude_pattern(mut self, pattern: Option<String>) -> Self {
        self.exclude_pattern = non_blank(pattern);
        self
    }

    pub fn headers_to_remove<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers_to_remove = names
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// A threshold of zero or less disables gap based page splitting
    pub fn pause_threshold_ms(mut self, ms: i64) -> Self {
        self.pause_threshold_ms = ms;
        self
    }

    pub fn add_pause(mut self, add: bool) -> Self {
        self.add_pause = add;
        self
    }

    pub fn page_start(mut self, start: u32) -> Self {
        self.page_start = start.max(1);
        self
    }

    pub fn sampler_start(mut self, start: u32) -> Self {
        self.sampler_start = start.max(1);
        self
    }

    pub fn max_string_size(mut self, size: usize) -> Self {
        self.max_string_size = if size == 0 { DEFAULT_MAX_STRING_SIZE } else { size };
        self
    }

    pub fn remove_cookie(mut self, remove: bool) -> Self {
        self.remove_cookie = remove;
        self
    }

    pub fn remove_cache_headers(mut self, remove: bool) -> Self {
        self.remove_cache_headers = remove;
        self
    }

    pub fn add_result_tree(mut self, add: bool) -> Self {
        self.add_result_tree = add;
        self
    }

    pub fn websocket_enabled(mut self, enabled: bool) -> Self {
        self.websocket_enabled = enabled;
        self
    }

    pub fn use_har_pages(mut self, use_pages: bool) -> Self {
        self.use_har_pages = use_pages;
        self
    }

    pub fn metadata_path(mut self, path: Option<PathBuf>) -> Self {
        self.metadata_path = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn build(self) -> ConversionConfig {
        let jmx_path = self
            .jmx_path
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| default_jmx_path(&self.har_path));

        ConversionConfig {
            har_path: self.har_path,
            jmx_path,
            recording_path: self.recording_path,
            include_pattern: self.include_pattern,
            exclude_pattern: self.exclude_pattern,
            headers_to_remove: self.headers_to_remove,
            pause_threshold_ms: self.pause_threshold_ms,
            add_pause: self.add_pause,
            page_start: self.page_start,
            sampler_start: self.sampler_start,
            max_string_size: self.max_string_size,
            remove_cookie: self.remove_cookie,
            remove_cache_headers: self.remove_cache_headers,
            add_result_tree: self.add_result_tree,
            websocket_enabled: self.websocket_enabled,
            use_har_pages: self.use_har_pages,
            metadata_path: self.metadata_path,
        }
    }
}

/// Input path with its extension replaced by `.jmx`
pub fn default_jmx_path(har_path: &Path) -> PathBuf {
    har_path.with_extension("jmx")
}

/// Split a comma separated header list, dropping blanks
pub fn parse_header_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the pause threshold; unparsable input falls back to 0 (no splitting)
pub fn lenient_pause_ms(raw: Option<&str>) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_PAUSE_THRESHOLD_MS,
        Some(s) => s.parse::<i64>().unwrap_or_else(|_| {
            tracing::warn!("Error parsing pause threshold, value = {}, set to 0", s);
            0
        }),
    }
}

/// Parse a page or sampler start number; anything below 1 becomes 1
pub fn lenient_start_number(name: &str, raw: Option<&str>) -> u32 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };
    match s.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).unwrap_or_else(|_| {
            tracing::warn!("{} value {} is out of range, set to 1", name, s);
            1
        }),
        Ok(_) => 1,
        Err(_) => {
            tracing::warn!("Error parsing {}, value = {}, set to 1", name, s);
            1
        }
    }
}

/// Parse the maximum string size; unparsable or non-positive input gives the default
pub fn lenient_max_string_size(raw: Option<&str>) -> usize {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_MAX_STRING_SIZE;
    };
    match s.parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_MAX_STRING_SIZE),
        Ok(_) => DEFAULT_MAX_STRING_SIZE,
        Err(_) => {
            tracing::warn!(
                "Error parsing max string size, value = {}, set to {} default value",
                s,
                DEFAULT_MAX_STRING_SIZE
            );
            DEFAULT_MAX_STRING_SIZE
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|p| !p.trim().is_empty())
}
