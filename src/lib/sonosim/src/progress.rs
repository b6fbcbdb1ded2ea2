use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

struct LoggerInner {
    last_log_time: Instant,
    buffer: String,
}

/// Thread-safe append-only log for long-running jobs.
///
/// Messages get a `[lap/total s] ` prefix where `lap` is whole seconds since
/// the previous [`log`] call and `total` is whole seconds since the logger
/// was created. A UI thread can snapshot the buffer through [`read`] while a
/// worker keeps appending.
///
/// [`log`]: AtomicLogger::log
/// [`read`]: AtomicLogger::read
pub struct AtomicLogger {
    construction_time: Instant,
    inner: Mutex<LoggerInner>,
}

impl AtomicLogger {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            construction_time: now,
            inner: Mutex::new(LoggerInner {
                last_log_time: now,
                buffer: String::new(),
            }),
        }
    }

    /// Append a timestamped line
    pub fn log(&self, message: &str) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        let lap = now.duration_since(inner.last_log_time).as_secs();
        let total = now.duration_since(self.construction_time).as_secs();

        inner.buffer.push_str(&format!("[{lap}/{total} s] "));
        inner.buffer.push_str(message);
        inner.buffer.push('\n');

        inner.last_log_time = now;
    }

    /// Append raw text without prefix or newline
    pub fn push(&self, message: &str) {
        self.inner.lock().buffer.push_str(message);
    }

    pub fn clear(&self) {
        self.inner.lock().buffer.clear();
    }

    /// Scoped shared view of the buffer. The lock is held for as long as the
    /// returned guard lives; appenders block in the meantime.
    pub fn read(&self) -> MappedMutexGuard<'_, str> {
        MutexGuard::map(self.inner.lock(), |inner| inner.buffer.as_mut_str())
    }
}

impl Default for AtomicLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state between the host application and one simulation worker.
/// Owned by the host and reused across jobs.
pub struct Progress {
    /// Gate read by the UI; only the worker transitions it back to false
    running: AtomicBool,
    /// Held by the worker for the life of one simulation
    job: Mutex<()>,
    pub log: AtomicLogger,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            job: Mutex::new(()),
            log: AtomicLogger::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claim the running flag. Fails when a job already holds it; no side
    /// effects in that case.
    pub(crate) fn try_start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Take the job mutex for the duration of a simulation. Dropping the
    /// guard releases the mutex and clears the running flag, on every exit
    /// path including panics.
    pub(crate) fn job_guard(&self) -> JobGuard<'_> {
        JobGuard {
            _job: self.job.lock(),
            running: &self.running,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct JobGuard<'a> {
    _job: MutexGuard<'a, ()>,
    running: &'a AtomicBool,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
