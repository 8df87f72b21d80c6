//! In-memory string destination

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// A cheaply cloneable text sink that gathers everything written to it.
///
/// Hand one clone to [`crate::LoggerThread::set_log_destination`] and keep
/// another to inspect the collected output, typically after shutdown. Bytes
/// are decoded as UTF-8 (lossily) on write.
///
/// # Example
///
/// ```
/// use task_logger_system::prelude::*;
///
/// let collector = StringCollector::new();
/// let mut writer = LoggerThread::new();
/// writer.set_log_destination(collector.clone()).unwrap();
/// writer.start().unwrap();
///
/// writer.logger_builder().build().info("captured");
///
/// writer.shutdown(std::time::Duration::ZERO);
/// assert!(collector.contents().contains("captured"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringCollector {
    buffer: Arc<Mutex<String>>,
}

impl StringCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The text collected so far, without clearing it.
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// The text collected so far; the internal buffer is reset.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }

    /// Discard everything collected so far.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

impl Write for StringCollector {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_writes() {
        let collector = StringCollector::new();
        let mut handle = collector.clone();
        handle.write_all(b"one\n").unwrap();
        handle.write_all(b"two\n").unwrap();
        assert_eq!(collector.contents(), "one\ntwo\n");
    }

    #[test]
    fn test_take_resets() {
        let collector = StringCollector::new();
        collector.clone().write_all(b"text").unwrap();
        assert_eq!(collector.take(), "text");
        assert!(collector.is_empty());
    }

    #[test]
    fn test_clear() {
        let collector = StringCollector::new();
        collector.clone().write_all(b"text").unwrap();
        collector.clear();
        assert_eq!(collector.contents(), "");
    }
}
