pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod har;
pub mod jmx;
pub mod metadata;
pub mod sampler;
pub mod transaction;

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{ConversionOutcome, RecordingStatus, convert};
pub use error::{Error, Result};
