pub mod completion;
pub mod convert;
