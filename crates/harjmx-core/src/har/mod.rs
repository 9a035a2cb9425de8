mod reader;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::{DEFAULT_MAX_STRING_SIZE, HarReader};
pub use types::*;
