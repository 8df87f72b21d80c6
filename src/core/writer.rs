//! Dedicated writer thread owning the log destination
//!
//! A [`LoggerThread`] funnels log tasks from arbitrarily many producer
//! threads into one destination. Producers never touch the destination;
//! their loggers enqueue [`LogTask`]s onto the writer's queue and the
//! dedicated loop executes them one at a time, in FIFO order. This
//! single-writer discipline is what makes concurrent logging line-atomic.

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::buffered_logger::BufferedTaskLogger;
use super::error::{LoggerError, Result};
use super::log_level::Level;
use super::log_task::LogTask;
use super::metrics::PipelineMetrics;
use super::task_logger::{LoggerCore, TaskLogger};
use crate::prefix::{PrefixFormatter, SharedFormatter};

/// Default shutdown timeout used when the writer is dropped without an
/// explicit shutdown (5 seconds)
///
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);
const FORCE_STOP_GRACE: Duration = Duration::from_millis(100);

/// State shared between the writer, its loop, and every child logger.
pub(crate) struct WriterShared {
    pub(crate) sender: Sender<LogTask>,
    /// Live child loggers, keyed by id. Producers register and close from
    /// arbitrary threads; the writer iterates during shutdown and broadcasts.
    pub(crate) children: Mutex<HashMap<u64, Arc<LoggerCore>>>,
    next_child_id: AtomicU64,
    /// Set by shutdown before anything else; enqueue failures are swallowed
    /// once this is true.
    pub(crate) stopping: AtomicBool,
    /// Cooperative cancellation for a timed-out drain: the loop discards the
    /// remaining queue instead of executing it.
    force_stop: AtomicBool,
    default_level: RwLock<Level>,
    default_formatter: RwLock<SharedFormatter>,
    pub(crate) metrics: PipelineMetrics,
}

struct Destination {
    sink: Box<dyn Write + Send>,
    auto_flush: bool,
}

enum WriterState {
    Created {
        task_rx: Receiver<LogTask>,
        stop_rx: Receiver<()>,
        destination: Option<Destination>,
    },
    Running {
        handle: thread::JoinHandle<()>,
    },
    Stopped,
}

/// Owner of one log destination and the dedicated thread serializing writes
/// to it.
///
/// Lifecycle: bind the destination exactly once, [`start`](Self::start) the
/// loop, hand out child loggers through
/// [`logger_builder`](Self::logger_builder), and finally
/// [`shutdown`](Self::shutdown). The destination is closed exactly once when
/// the loop exits, regardless of how it terminated.
///
/// # Example
///
/// ```
/// use task_logger_system::prelude::*;
///
/// let mut writer = LoggerThread::new();
/// writer.set_log_destination(std::io::sink()).unwrap();
/// writer.start().unwrap();
///
/// let logger = writer.logger_builder().prefix_string("worker-1").build();
/// logger.info("hello");
///
/// writer.shutdown(std::time::Duration::ZERO);
/// ```
pub struct LoggerThread {
    shared: Arc<WriterShared>,
    stop_tx: Sender<()>,
    state: WriterState,
}

impl LoggerThread {
    #[must_use]
    pub fn new() -> Self {
        let (sender, task_rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(1);
        let shared = Arc::new(WriterShared {
            sender,
            children: Mutex::new(HashMap::new()),
            next_child_id: AtomicU64::new(0),
            stopping: AtomicBool::new(false),
            force_stop: AtomicBool::new(false),
            default_level: RwLock::new(Level::default()),
            default_formatter: RwLock::new(PrefixFormatter::default().shared()),
            metrics: PipelineMetrics::new(),
        });
        Self {
            shared,
            stop_tx,
            state: WriterState::Created {
                task_rx,
                stop_rx,
                destination: None,
            },
        }
    }

    /// Bind the output destination with auto-flush enabled. Text reaches the
    /// sink UTF-8 encoded, one flush per executed task.
    pub fn set_log_destination<W>(&mut self, sink: W) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        self.set_log_destination_with(sink, true)
    }

    /// Bind the output destination. The destination is set exactly once,
    /// before the writer starts; a second bind, or a bind after start, is a
    /// configuration error.
    ///
    /// With `auto_flush` false the sink is only flushed on shutdown.
    pub fn set_log_destination_with<W>(&mut self, sink: W, auto_flush: bool) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        match &mut self.state {
            WriterState::Created { destination, .. } => {
                if destination.is_some() {
                    return Err(LoggerError::config(
                        "destination",
                        "log destination is already set, cannot modify",
                    ));
                }
                *destination = Some(Destination {
                    sink: Box::new(sink),
                    auto_flush,
                });
                Ok(())
            }
            WriterState::Running { .. } => Err(LoggerError::config(
                "destination",
                "cannot bind a destination after the writer has started",
            )),
            WriterState::Stopped => Err(LoggerError::WriterStopped),
        }
    }

    /// Start the dedicated writer loop. The destination must already be
    /// bound.
    pub fn start(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, WriterState::Stopped) {
            WriterState::Created {
                task_rx,
                stop_rx,
                destination: Some(destination),
            } => {
                let shared = Arc::clone(&self.shared);
                let handle = thread::Builder::new()
                    .name("log-writer".to_string())
                    .spawn(move || run(&shared, &task_rx, &stop_rx, destination))?;
                self.state = WriterState::Running { handle };
                Ok(())
            }
            state @ WriterState::Created {
                destination: None, ..
            } => {
                self.state = state;
                Err(LoggerError::config(
                    "destination",
                    "log destination must be set before starting the writer",
                ))
            }
            state @ WriterState::Running { .. } => {
                self.state = state;
                Err(LoggerError::config(
                    "writer",
                    "writer thread is already running",
                ))
            }
            WriterState::Stopped => Err(LoggerError::WriterStopped),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WriterState::Running { .. })
    }

    /// Builder for child loggers bound to this writer. The builder snapshots
    /// the writer's current default level and formatter at this call.
    pub fn logger_builder(&self) -> LoggerBuilder<'_> {
        LoggerBuilder {
            writer: self,
            level: self.level(),
            formatter: self.prefix_formatter(),
            prefix_string: None,
            duplicate_formatter: false,
        }
    }

    /// Default level for loggers created after this point.
    pub fn level(&self) -> Level {
        *self.shared.default_level.read()
    }

    /// Set the default level. Existing children are unaffected; see
    /// [`set_level_all_children`](Self::set_level_all_children).
    pub fn set_level(&self, level: Level) {
        *self.shared.default_level.write() = level;
    }

    /// Whether a child created now would log at `level`.
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Default formatter handle for loggers created after this point.
    pub fn prefix_formatter(&self) -> SharedFormatter {
        self.shared.default_formatter.read().clone()
    }

    /// Replace the default formatter. Existing children keep theirs; see
    /// [`set_prefix_all_children`](Self::set_prefix_all_children).
    pub fn set_prefix_formatter(&self, formatter: SharedFormatter) {
        *self.shared.default_formatter.write() = formatter;
    }

    /// Set the default level and propagate it synchronously to every
    /// currently-registered child.
    pub fn set_level_all_children(&self, level: Level) {
        self.set_level(level);
        for child in self.children_snapshot() {
            child.set_level(level);
        }
    }

    /// Transform the default formatter and, synchronously, every registered
    /// child's formatter. Each child ends up with its own fresh handle, so a
    /// formatter shared between children beforehand is no longer aliased
    /// afterwards.
    pub fn set_prefix_all_children<F>(&self, transform: F)
    where
        F: Fn(&PrefixFormatter) -> PrefixFormatter,
    {
        let new_default = {
            let handle = self.prefix_formatter();
            let guard = handle.read();
            transform(&guard)
        };
        self.set_prefix_formatter(new_default.shared());
        for child in self.children_snapshot() {
            child.apply_formatter(&transform);
        }
    }

    /// Number of currently-registered child loggers.
    pub fn child_count(&self) -> usize {
        self.shared.children.lock().len()
    }

    /// Counters for this writer's pipeline.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.shared.metrics
    }

    /// Stop the writer: close every registered child (buffered loggers flush
    /// first), then wait for the loop to drain the queue and close the
    /// destination.
    ///
    /// A zero `timeout` waits indefinitely for a graceful drain. A positive
    /// timeout bounds the wait; past it the loop is asked to discard the
    /// remaining queue, the discard is noted on the destination best-effort,
    /// and this returns `false`. Logging calls made after shutdown are
    /// silent no-ops. Idempotent.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        self.shared.stopping.store(true, Ordering::Release);
        for child in self.children_snapshot() {
            child.close();
        }

        let handle = match std::mem::replace(&mut self.state, WriterState::Stopped) {
            WriterState::Running { handle } => handle,
            // Never started: there is no queue consumer; dropping the
            // channel ends here and the unopened destination is released.
            WriterState::Created { .. } | WriterState::Stopped => return true,
        };

        let _ = self.stop_tx.try_send(());

        if timeout.is_zero() {
            return join_writer(handle);
        }

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if handle.is_finished() {
                return join_writer(handle);
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        // Timed out: flip the cooperative force-stop flag and give the loop
        // a short grace period to discard the queue and close the
        // destination.
        self.shared.force_stop.store(true, Ordering::Release);
        let grace = Instant::now() + FORCE_STOP_GRACE;
        while Instant::now() < grace && !handle.is_finished() {
            thread::sleep(JOIN_POLL_INTERVAL);
        }
        if handle.is_finished() {
            let _ = join_writer(handle);
        }
        eprintln!(
            "[logger] writer did not drain within {:?}; remaining tasks discarded",
            timeout
        );
        false
    }

    fn children_snapshot(&self) -> Vec<Arc<LoggerCore>> {
        self.shared.children.lock().values().cloned().collect()
    }
}

impl Default for LoggerThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoggerThread {
    fn drop(&mut self) {
        if self.is_running() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }
}

fn run(
    shared: &Arc<WriterShared>,
    task_rx: &Receiver<LogTask>,
    stop_rx: &Receiver<()>,
    mut destination: Destination,
) {
    loop {
        select! {
            recv(task_rx) -> task => {
                match task {
                    Ok(task) => execute(shared, &mut destination, task),
                    Err(_) => break,
                }
            }
            recv(stop_rx) -> _ => {
                drain(shared, task_rx, &mut destination);
                break;
            }
        }
    }
    if let Err(e) = destination.sink.flush() {
        eprintln!("[logger] failed to flush log destination on shutdown: {}", e);
    }
    // destination dropped here: closed exactly once, on the writer thread
}

// Stop signal received: execute what is already queued, unless a timed-out
// shutdown flipped force_stop, in which case the remainder is discarded.
fn drain(shared: &Arc<WriterShared>, task_rx: &Receiver<LogTask>, destination: &mut Destination) {
    let mut discarded: u64 = 0;
    while let Ok(task) = task_rx.try_recv() {
        if shared.force_stop.load(Ordering::Acquire) {
            shared.metrics.record_dropped();
            discarded += 1;
            continue;
        }
        execute(shared, destination, task);
    }
    if discarded > 0 {
        let _ = writeln!(
            destination.sink,
            "log writer shutdown timed out; {} queued tasks discarded",
            discarded
        );
    }
}

fn execute(shared: &Arc<WriterShared>, destination: &mut Destination, task: LogTask) {
    let result = task.execute(destination.sink.as_mut()).and_then(|()| {
        if destination.auto_flush {
            destination.sink.flush()
        } else {
            Ok(())
        }
    });
    match result {
        Ok(()) => {
            shared.metrics.record_executed();
        }
        Err(e) => {
            shared.metrics.record_dropped();
            eprintln!("[logger] failed to write log task: {}", e);
        }
    }
}

fn join_writer(handle: thread::JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            eprintln!("[logger] writer thread panicked during shutdown");
            false
        }
    }
}

/// Builder for child loggers of one [`LoggerThread`].
///
/// Level and formatter default to the writer's settings at the time the
/// builder was created. The same builder can produce any number of loggers;
/// each [`build`](Self::build) registers a new child with the writer.
///
/// With `duplicate_formatter` false (the default) every logger built shares
/// the configured formatter handle, so a pattern change through one is seen
/// by all of them; with it true each logger gets an independent copy.
pub struct LoggerBuilder<'a> {
    writer: &'a LoggerThread,
    level: Level,
    formatter: SharedFormatter,
    prefix_string: Option<String>,
    duplicate_formatter: bool,
}

impl LoggerBuilder<'_> {
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix_string(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_string = Some(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn duplicate_formatter(mut self, duplicate: bool) -> Self {
        self.duplicate_formatter = duplicate;
        self
    }

    /// Build a [`TaskLogger`] wired to this writer's queue.
    pub fn build(&self) -> TaskLogger {
        TaskLogger {
            core: self.register(false),
        }
    }

    /// Build a [`BufferedTaskLogger`] wired to this writer's queue.
    pub fn build_buffered(&self) -> BufferedTaskLogger {
        BufferedTaskLogger {
            core: self.register(true),
        }
    }

    fn formatter_handle(&self) -> SharedFormatter {
        if self.duplicate_formatter {
            self.formatter.read().duplicate().shared()
        } else {
            Arc::clone(&self.formatter)
        }
    }

    fn register(&self, buffered: bool) -> Arc<LoggerCore> {
        let shared = &self.writer.shared;
        let id = shared.next_child_id.fetch_add(1, Ordering::Relaxed);
        let core = Arc::new(LoggerCore::new(
            id,
            self.level,
            self.formatter_handle(),
            self.prefix_string.clone(),
            buffered,
            Arc::clone(shared),
        ));
        shared.children.lock().insert(id, Arc::clone(&core));
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_bound_twice_fails() {
        let mut writer = LoggerThread::new();
        writer.set_log_destination(std::io::sink()).unwrap();
        let err = writer.set_log_destination(std::io::sink()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_start_without_destination_fails() {
        let mut writer = LoggerThread::new();
        let err = writer.start().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        // the failure leaves the writer configurable
        writer.set_log_destination(std::io::sink()).unwrap();
        writer.start().unwrap();
        assert!(writer.shutdown(Duration::ZERO));
    }

    #[test]
    fn test_bind_after_start_fails() {
        let mut writer = LoggerThread::new();
        writer.set_log_destination(std::io::sink()).unwrap();
        writer.start().unwrap();
        let err = writer.set_log_destination(std::io::sink()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        writer.shutdown(Duration::ZERO);
    }

    #[test]
    fn test_double_start_fails() {
        let mut writer = LoggerThread::new();
        writer.set_log_destination(std::io::sink()).unwrap();
        writer.start().unwrap();
        assert!(writer.start().is_err());
        writer.shutdown(Duration::ZERO);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut writer = LoggerThread::new();
        writer.set_log_destination(std::io::sink()).unwrap();
        writer.start().unwrap();
        assert!(writer.shutdown(Duration::ZERO));
        assert!(writer.shutdown(Duration::ZERO));
    }

    #[test]
    fn test_shutdown_without_start() {
        let mut writer = LoggerThread::new();
        assert!(writer.shutdown(Duration::ZERO));
    }

    #[test]
    fn test_builder_snapshots_writer_defaults() {
        let writer = LoggerThread::new();
        writer.set_level(Level::Error);
        let builder = writer.logger_builder();
        // later default changes do not affect an existing builder
        writer.set_level(Level::Trace);
        let logger = builder.build();
        assert_eq!(logger.level(), Level::Error);
        assert_eq!(writer.child_count(), 1);
    }

    #[test]
    fn test_close_unregisters_child() {
        let writer = LoggerThread::new();
        let logger = writer.logger_builder().build();
        assert_eq!(writer.child_count(), 1);
        logger.close();
        assert_eq!(writer.child_count(), 0);
        // close is idempotent
        logger.close();
        assert_eq!(writer.child_count(), 0);
    }

    #[test]
    fn test_drop_unregisters_child() {
        let writer = LoggerThread::new();
        {
            let _logger = writer.logger_builder().build();
            assert_eq!(writer.child_count(), 1);
        }
        assert_eq!(writer.child_count(), 0);
    }
}
