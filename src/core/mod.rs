//! Core pipeline types

pub mod buffered_logger;
pub mod error;
pub mod log_level;
pub mod log_task;
pub mod metrics;
pub mod task_logger;
pub mod writer;

pub use buffered_logger::BufferedTaskLogger;
pub use error::{LoggerError, Result};
pub use log_level::Level;
pub use log_task::LogTask;
pub use metrics::PipelineMetrics;
pub use task_logger::TaskLogger;
pub use writer::{LoggerBuilder, LoggerThread, DEFAULT_SHUTDOWN_TIMEOUT};
