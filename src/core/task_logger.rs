//! Task-based per-producer logger handle

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::log_level::Level;
use super::log_task::LogTask;
use super::writer::WriterShared;
use crate::prefix::{PrefixFormatter, SharedFormatter};

/// State shared between a logger handle and the writer's child registry.
///
/// Producers mutate configuration from their own threads while the writer
/// iterates the registry during shutdown and broadcast operations, so every
/// field is individually guarded.
pub(crate) struct LoggerCore {
    id: u64,
    level: RwLock<Level>,
    formatter: RwLock<SharedFormatter>,
    prefix_string: RwLock<Option<String>>,
    /// `Some` for buffered loggers: rendered lines accumulate here until flush.
    buffer: Option<Mutex<String>>,
    closed: AtomicBool,
    writer: Arc<WriterShared>,
}

impl LoggerCore {
    pub(crate) fn new(
        id: u64,
        level: Level,
        formatter: SharedFormatter,
        prefix_string: Option<String>,
        buffered: bool,
        writer: Arc<WriterShared>,
    ) -> Self {
        Self {
            id,
            level: RwLock::new(level),
            formatter: RwLock::new(formatter),
            prefix_string: RwLock::new(prefix_string),
            buffer: buffered.then(|| Mutex::new(String::new())),
            closed: AtomicBool::new(false),
            writer,
        }
    }

    pub(crate) fn level(&self) -> Level {
        *self.level.read()
    }

    pub(crate) fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    pub(crate) fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    pub(crate) fn formatter(&self) -> SharedFormatter {
        self.formatter.read().clone()
    }

    pub(crate) fn set_formatter(&self, formatter: SharedFormatter) {
        *self.formatter.write() = formatter;
    }

    /// Replace this logger's formatter with the transformed copy. Used by the
    /// writer's prefix broadcast; the result is always a fresh handle, so a
    /// formerly shared formatter becomes private to this logger.
    pub(crate) fn apply_formatter(&self, transform: &dyn Fn(&PrefixFormatter) -> PrefixFormatter) {
        let new_formatter = {
            let handle = self.formatter();
            let guard = handle.read();
            transform(&guard)
        };
        self.set_formatter(new_formatter.shared());
    }

    pub(crate) fn set_prefix_string(&self, prefix: Option<String>) {
        *self.prefix_string.write() = prefix;
    }

    /// Render and emit one message. No-op when the level is disabled or the
    /// logger is closed; the disabled path allocates nothing.
    pub(crate) fn write_string(&self, level: Level, message: &str) {
        if self.closed.load(Ordering::Acquire) || !self.is_enabled(level) {
            return;
        }
        let mut line = {
            let handle = self.formatter();
            let guard = handle.read();
            guard.format(level, self.prefix_string.read().as_deref())
        };
        line.push_str(message);
        match &self.buffer {
            Some(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(&line);
                buffer.push('\n');
            }
            None => self.enqueue(LogTask::Line(line)),
        }
    }

    pub(crate) fn new_line(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        match &self.buffer {
            Some(buffer) => buffer.lock().push('\n'),
            None => self.enqueue(LogTask::NewLine),
        }
    }

    /// Atomically drain the private buffer into one block task. No-op when
    /// the buffer is empty or this logger is unbuffered.
    pub(crate) fn flush_buffer(&self) {
        if let Some(buffer) = &self.buffer {
            let text = std::mem::take(&mut *buffer.lock());
            if !text.is_empty() {
                self.enqueue(LogTask::Block(text));
            }
        }
    }

    // Hands the task to the writer's queue, never executes it inline. The
    // only send failure on an unbounded channel is a disconnected writer;
    // during shutdown that is expected and swallowed.
    fn enqueue(&self, task: LogTask) {
        match self.writer.sender.send(task) {
            Ok(()) => {
                self.writer.metrics.record_enqueued();
            }
            Err(_) => {
                self.writer.metrics.record_dropped();
                if !self.writer.stopping.load(Ordering::Acquire) {
                    eprintln!("[logger] writer thread is not running; a log task was dropped");
                }
            }
        }
    }

    /// Idempotent: flushes any buffered content, then unregisters from the
    /// writer's child set.
    pub(crate) fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.flush_buffer();
        self.writer.children.lock().remove(&self.id);
    }
}

/// Per-producer logger that turns `log` calls into [`LogTask`]s handed to its
/// writer's queue.
///
/// A `TaskLogger` never touches the destination itself; each enabled call
/// renders the line on the producer thread and enqueues it. Created through
/// [`crate::LoggerThread::logger_builder`]; closing (explicitly or on drop)
/// unregisters it from the writer.
pub struct TaskLogger {
    pub(crate) core: Arc<LoggerCore>,
}

impl TaskLogger {
    /// Emit one message at `level`. Below the threshold this is an O(1)
    /// no-op.
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

    /// Enqueue a bare line terminator.
    pub fn new_line(&self) {
        self.core.new_line();
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

    /// Close this logger and unregister it from its writer. Idempotent;
    /// subsequent logging calls are silent no-ops.
    pub fn close(&self) {
        self.core.close();
    }
}

impl Drop for TaskLogger {
    fn drop(&mut self) {
        self.core.close();
    }
}
