//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They work with
//! both [`crate::TaskLogger`] and [`crate::BufferedTaskLogger`].
//!
//! # Examples
//!
//! ```
//! use task_logger_system::prelude::*;
//! use task_logger_system::info;
//!
//! let mut writer = LoggerThread::new();
//! writer.set_log_destination(std::io::sink()).unwrap();
//! writer.start().unwrap();
//! let logger = writer.logger_builder().build();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! writer.shutdown(std::time::Duration::ZERO);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().build();
/// use task_logger_system::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().level(Level::Trace).build();
/// use task_logger_system::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().level(Level::Debug).build();
/// use task_logger_system::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().build();
/// use task_logger_system::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().build();
/// use task_logger_system::warning;
/// warning!(logger, "Low disk space");
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().build();
/// use task_logger_system::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// # Examples
///
/// ```
/// # use task_logger_system::prelude::*;
/// # let writer = LoggerThread::new();
/// # let logger = writer.logger_builder().build();
/// use task_logger_system::fatal;
/// fatal!(logger, "Critical system failure");
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Level, LoggerThread};
    use crate::sinks::StringCollector;
    use std::time::Duration;

    fn started_writer(collector: &StringCollector) -> LoggerThread {
        let mut writer = LoggerThread::new();
        writer.set_log_destination(collector.clone()).unwrap();
        writer.start().unwrap();
        writer
    }

    #[test]
    fn test_log_macro() {
        let collector = StringCollector::new();
        let mut writer = started_writer(&collector);
        let logger = writer.logger_builder().build();
        log!(logger, Level::Info, "Test message");
        log!(logger, Level::Info, "Formatted: {}", 42);
        writer.shutdown(Duration::ZERO);
        assert!(collector.contents().contains("Formatted: 42"));
    }

    #[test]
    fn test_trace_macro() {
        let collector = StringCollector::new();
        let mut writer = started_writer(&collector);
        let logger = writer.logger_builder().level(Level::Trace).build();
        trace!(logger, "Trace message");
        trace!(logger, "Value: {}", 10);
        writer.shutdown(Duration::ZERO);
        assert!(collector.contents().contains("Value: 10"));
    }

    #[test]
    fn test_level_macros() {
        let collector = StringCollector::new();
        let mut writer = started_writer(&collector);
        let logger = writer.logger_builder().level(Level::Debug).build();
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warning!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        fatal!(logger, "Critical failure: {}", "system");
        writer.shutdown(Duration::ZERO);
        let output = collector.contents();
        assert!(output.contains("Count: 5"));
        assert!(output.contains("Items: 100"));
        assert!(output.contains("Retry 1 of 3"));
        assert!(output.contains("Code: 500"));
        assert!(output.contains("Critical failure: system"));
    }
}
