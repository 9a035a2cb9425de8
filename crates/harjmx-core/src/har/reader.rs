use super::types::Har;
use crate::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default upper bound on the length of a single JSON string token
///
/// The limit decides which documents are accepted, it does not bound
/// memory: the whole document is parsed into a JSON tree before any
/// string is measured, so an oversized field is held in memory once
/// before it is rejected.
pub const DEFAULT_MAX_STRING_SIZE: usize = 20_000_000;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    ///
    /// Every string in the document (keys included) is checked against
    /// `max_string_size` before the typed model is built; the first token
    /// over the limit aborts the parse with [`Error::OversizedField`].
    pub fn from_file(path: &Path, max_string_size: usize) -> Result<Har> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let file = File::open(path).map_err(|source| Error::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let har = Self::from_reader(BufReader::new(file), max_string_size).map_err(|e| match e {
            Error::InputUnreadable { source, .. } => Error::InputUnreadable {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(
            "Successfully parsed HAR file with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Parse a HAR document from a JSON string
    pub fn from_str(content: &str, max_string_size: usize) -> Result<Har> {
        tracing::debug!("Parsing HAR from string");

        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
        Self::from_value(value, max_string_size)
    }

    fn from_reader<R: Read>(reader: R, max_string_size: usize) -> Result<Har> {
        let value: Value = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                Error::InputUnreadable {
                    path: Default::default(),
                    source: std::io::Error::other(e),
                }
            } else {
                Error::MalformedInput(e.to_string())
            }
        })?;
        Self::from_value(value, max_string_size)
    }

    fn from_value(value: Value, max_string_size: usize) -> Result<Har> {
        let mut path = String::new();
        check_strings(&value, &mut path, None, max_string_size)?;

        if value.pointer("/log/entries").is_none() {
            return Err(Error::MalformedInput(
                "missing required field log.entries".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| Error::MalformedInput(e.to_string()))
    }
}

/// Walk a JSON tree and reject the first string longer than `limit` characters
fn check_strings(value: &Value, path: &mut String, entry: Option<usize>, limit: usize) -> Result<()> {
    match value {
        Value::String(s) => check_len(s, path, entry, limit),
        Value::Array(items) => {
            let in_entries = path == "log.entries";
            for (idx, item) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{idx}]"));
                let entry = if in_entries { Some(idx) } else { entry };
                check_strings(item, path, entry, limit)?;
                path.truncate(len);
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, item) in map {
                let len = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                check_len(key, path, entry, limit)?;
                check_strings(item, path, entry, limit)?;
                path.truncate(len);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_len(s: &str, path: &str, entry: Option<usize>, limit: usize) -> Result<()> {
    // byte length bounds the char count from above
    if s.len() <= limit || s.chars().count() <= limit {
        return Ok(());
    }
    tracing::debug!("String field {} is over the {} character limit", path, limit);
    Err(Error::OversizedField {
        field: path.to_string(),
        entry,
        limit,
    })
}
