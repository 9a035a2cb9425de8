use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read HAR file {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid HAR structure: {0}")]
    MalformedInput(String),

    #[error("String field {field} exceeds the maximum string size of {limit} characters (entry {})", entry.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string()))]
    OversizedField {
        field: String,
        entry: Option<usize>,
        limit: usize,
    },

    #[error("Invalid URL filter pattern '{pattern}': {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read metadata file {}: {reason}", path.display())]
    MetadataReadError { path: PathBuf, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error was raised by one of the output writers
    pub fn is_output_error(&self) -> bool {
        matches!(self, Error::OutputWriteError { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
