//! External page metadata.
//!
//! A side file maps page keys (the page number, or the HAR page id) to a
//! display name and/or a pause override. It is read from CSV
//! (`key,displayName,pauseOverrideMs`) or from a JSON array of objects with
//! the same fields; the format follows the file extension.

use crate::transaction::Page;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Overrides for a single page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOverride {
    pub display_name: Option<String>,
    pub pause_override_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalMetadata {
    overrides: BTreeMap<String, PageOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord {
    key: serde_json::Value,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    pause_override_ms: Option<serde_json::Value>,
}

impl ExternalMetadata {
    /// Load metadata from a `.csv` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading page metadata from: {}", path.display());

        let fail = |reason: String| Error::MetadataReadError {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let metadata = match extension.as_str() {
            "csv" => Self::from_csv(&content),
            "json" => Self::from_json(&content),
            other => Err(format!(
                "unsupported metadata format '{}', expected .csv or .json",
                other
            )),
        }
        .map_err(fail)?;

        tracing::info!("Loaded {} page metadata record(s)", metadata.len());
        Ok(metadata)
    }

    pub fn from_csv(content: &str) -> std::result::Result<Self, String> {
        let mut overrides = BTreeMap::new();
        let mut first_record = true;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let separator = if !trimmed.contains(',') && trimmed.contains(';') {
                ';'
            } else {
                ','
            };
            let fields = split_csv_line(trimmed, separator)
                .map_err(|e| format!("line {}: {}", line_no, e))?;

            if first_record {
                first_record = false;
                if fields
                    .first()
                    .is_some_and(|f| f.trim().eq_ignore_ascii_case("key"))
                {
                    continue;
                }
            }

            let key = fields.first().map(|f| f.trim()).unwrap_or_default();
            if key.is_empty() {
                return Err(format!("line {}: empty key", line_no));
            }
            if fields.len() > 3 {
                return Err(format!(
                    "line {}: expected at most 3 fields, found {}",
                    line_no,
                    fields.len()
                ));
            }
            let display_name = fields.get(1).map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
            let pause_override_ms = match fields.get(2).map(|f| f.trim()).filter(|f| !f.is_empty()) {
                None => None,
                Some(raw) => Some(
                    raw.parse::<u64>()
                        .map_err(|_| format!("line {}: invalid pauseOverrideMs '{}'", line_no, raw))?,
                ),
            };

            overrides.insert(
                normalize_key(key),
                PageOverride {
                    display_name,
                    pause_override_ms,
                },
            );
        }

        Ok(Self { overrides })
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        let records: Vec<JsonRecord> = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let mut overrides = BTreeMap::new();

        for (idx, record) in records.into_iter().enumerate() {
            let key = match &record.key {
                serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => return Err(format!("record {}: invalid key {}", idx, other)),
            };
            let pause_override_ms = match &record.pause_override_ms {
                None | Some(serde_json::Value::Null) => None,
                Some(serde_json::Value::Number(n)) => Some(
                    n.as_u64()
                        .ok_or_else(|| format!("record {}: invalid pauseOverrideMs {}", idx, n))?,
                ),
                Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
                Some(serde_json::Value::String(s)) => Some(
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| format!("record {}: invalid pauseOverrideMs '{}'", idx, s))?,
                ),
                Some(other) => return Err(format!("record {}: invalid pauseOverrideMs {}", idx, other)),
            };

            overrides.insert(
                normalize_key(&key),
                PageOverride {
                    display_name: record.display_name.filter(|n| !n.trim().is_empty()),
                    pause_override_ms,
                },
            );
        }

        Ok(Self { overrides })
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PageOverride> {
        self.overrides.get(&normalize_key(key))
    }

    /// Apply overrides to the pages
    ///
    /// A page is looked up by its number first, then by its HAR page id.
    /// Returns the keys that matched no page.
    pub fn merge(&self, pages: &mut [Page]) -> Vec<String> {
        let mut used = std::collections::BTreeSet::new();

        for page in pages.iter_mut() {
            let number_key = page.number.to_string();
            let found = self
                .overrides
                .get_key_value(&number_key)
                .or_else(|| {
                    page.har_page_id
                        .as_deref()
                        .and_then(|id| self.overrides.get_key_value(&normalize_key(id)))
                });
            let Some((key, page_override)) = found else {
                continue;
            };
            used.insert(key.clone());

            if let Some(name) = &page_override.display_name {
                tracing::debug!("Renaming page {} to '{}'", page.number, name);
                page.name = name.clone();
            }
            if let Some(pause) = page_override.pause_override_ms {
                page.pause_ms = (pause > 0).then_some(pause);
            }
        }

        self.overrides
            .keys()
            .filter(|k| !used.contains(*k))
            .cloned()
            .collect()
    }
}

/// Numeric keys compare by value so `01` and `1` address the same page
fn normalize_key(key: &str) -> String {
    let key = key.trim();
    match key.parse::<u64>() {
        Ok(n) => n.to_string(),
        Err(_) => key.to_string(),
    }
}

/// Split one CSV record, honouring double-quoted fields
fn split_csv_line(line: &str, separator: char) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            c if c == separator && !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            c => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}
