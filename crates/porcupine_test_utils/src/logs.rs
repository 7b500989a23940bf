//! Log capture.
//!
//! Runs a closure under a thread-local `fmt` subscriber that writes plain
//! text into a shared buffer, so tests can assert on what was logged.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Text logged while a closure ran.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    /// Everything captured so far.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Captured lines at `level`, e.g. `WARN`.
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        let tag = level.to_string();
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().next() == Some(tag.as_str()))
            .map(str::to_string)
            .collect()
    }

    /// Captured warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.lines_at(Level::WARN)
    }

    /// Captured warnings that contain every one of `needles`.
    pub fn warnings_containing(&self, needles: &[&str]) -> Vec<String> {
        self.warnings()
            .into_iter()
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .collect()
    }
}

/// Writer handed out per event.
#[derive(Debug)]
pub struct LogWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Run `f` with every event at `DEBUG` and above captured.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, LogBuffer) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_max_level(Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer)
}
