//! JMeter output: the `.jmx` test plan and the XML recording of the
//! original responses.

mod recording;
mod writer;
pub mod xml;

pub use recording::RecordingWriter;
pub use writer::{JmxOptions, JmxWriter};

use crate::{Error, Result};
use std::path::Path;

/// Write a fully rendered document, creating missing parent directories
fn write_output(path: &Path, content: &str) -> Result<()> {
    let fail = |source| Error::OutputWriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    std::fs::write(path, content).map_err(fail)
}
