//! `io::Write` adapter in front of a task logger

use std::io::{self, Write};

use crate::core::log_level::Level;
use crate::core::task_logger::TaskLogger;

/// Adapts a [`TaskLogger`] to `io::Write`, so byte-oriented producers (child
/// process output, legacy `write!` call sites) can feed the pipeline.
///
/// Bytes are buffered until a line terminator arrives; each complete line is
/// logged at the configured level with the terminator stripped (a trailing
/// `\r` from `\r\n` input is stripped too). [`flush`](Write::flush) and drop
/// emit any unterminated tail as its own line.
pub struct LoggerWriter {
    logger: TaskLogger,
    level: Level,
    pending: Vec<u8>,
}

impl LoggerWriter {
    pub fn new(logger: TaskLogger, level: Level) -> Self {
        Self {
            logger,
            level,
            pending: Vec::new(),
        }
    }

    /// The logger this adapter feeds.
    pub fn logger(&self) -> &TaskLogger {
        &self.logger
    }

    fn emit(&mut self, line: &[u8]) {
        let mut line = line;
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        self.logger
            .log(self.level, String::from_utf8_lossy(line).as_ref());
    }

    fn emit_pending(&mut self) {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.emit(&pending);
        }
    }
}

impl Write for LoggerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let line = std::mem::replace(&mut self.pending, rest);
            self.emit(&line[..line.len() - 1]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_pending();
        Ok(())
    }
}

impl Drop for LoggerWriter {
    fn drop(&mut self) {
        self.emit_pending();
    }
}
