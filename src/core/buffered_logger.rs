//! Buffered variant of the task logger

use std::sync::Arc;

use super::log_level::Level;
use super::task_logger::LoggerCore;
use crate::prefix::SharedFormatter;

/// A task logger that accumulates rendered lines in a private buffer and only
/// hands the writer a single [`crate::LogTask`] on [`flush`](Self::flush).
///
/// Until flush, nothing this logger writes is visible to the writer; the
/// relative order of its own lines is preserved within the buffer and, after
/// flush, within the queue. Closing (explicitly or on drop) flushes first, so
/// buffered content is never silently dropped.
pub struct BufferedTaskLogger {
    pub(crate) core: Arc<LoggerCore>,
}

impl BufferedTaskLogger {
    /// Append one rendered line to the private buffer. Below the threshold
    /// this is an O(1) no-op.
    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        self.core.write_string(level, message.as_ref());
    }

    pub fn trace(&self, message: impl AsRef<str>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message);
    }

    pub fn fatal(&self, message: impl AsRef<str>) {
        self.log(Level::Fatal, message);
    }

    /// Append a bare line terminator to the buffer.
    pub fn new_line(&self) {
        self.core.new_line();
    }

    /// Submit the buffered content as one task and reset the buffer.
    /// A flush with an empty buffer is a no-op, so repeated flushes emit
    /// output only once.
    pub fn flush(&self) {
        self.core.flush_buffer();
    }

    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Change the threshold; affects subsequent calls only.
    pub fn set_level(&self, level: Level) {
        self.core.set_level(level);
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.core.is_enabled(level)
    }

    /// The formatter handle this logger renders with. Mutating through the
    /// handle affects every logger sharing it.
    pub fn prefix_formatter(&self) -> SharedFormatter {
        self.core.formatter()
    }

    pub fn set_prefix_formatter(&self, formatter: SharedFormatter) {
        self.core.set_formatter(formatter);
    }

    /// Set the `%p` instance prefix string.
    pub fn set_prefix_string(&self, prefix: impl Into<String>) {
        self.core.set_prefix_string(Some(prefix.into()));
    }

    /// Flush remaining buffered content, then close and unregister this
    /// logger. Idempotent.
    pub fn close(&self) {
        self.core.close();
    }
}

impl Drop for BufferedTaskLogger {
    fn drop(&mut self) {
        self.core.close();
    }
}
