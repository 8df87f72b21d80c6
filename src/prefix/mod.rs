//! Per-line prefix formatting

pub mod formatter;

pub use formatter::{PrefixFormatter, SharedFormatter};
