//! # Task Logger System
//!
//! A task-based Rust logging pipeline: multiple producer threads emit
//! leveled, prefixed log lines that are funneled, as deferred log tasks, into
//! one dedicated writer thread that owns the output destination.
//!
//! ## Features
//!
//! - **Single-Writer Discipline**: one thread owns the destination, so
//!   concurrent producers never interleave mid-line
//! - **Deferred Tasks**: producers render lines locally and enqueue; the
//!   writer drains in FIFO order
//! - **Buffered Loggers**: accumulate lines privately and submit one task on
//!   explicit flush
//! - **Pattern Prefixes**: `%l`/`%t`/`%d{...}`/`%p` prefix templates, shared
//!   or duplicated per logger

pub mod core;
pub mod macros;
pub mod prefix;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        BufferedTaskLogger, Level, LogTask, LoggerBuilder, LoggerError, LoggerThread,
        PipelineMetrics, Result, TaskLogger, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::prefix::{PrefixFormatter, SharedFormatter};
    pub use crate::sinks::{LoggerWriter, StringCollector};
}

pub use crate::core::{
    BufferedTaskLogger, Level, LogTask, LoggerBuilder, LoggerError, LoggerThread, PipelineMetrics,
    Result, TaskLogger, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::prefix::{PrefixFormatter, SharedFormatter};
pub use crate::sinks::{LoggerWriter, StringCollector};
