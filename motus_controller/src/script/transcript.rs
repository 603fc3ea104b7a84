//! Startup transcript.
//!
//! Line-oriented and flushed per line so the file is complete even if the
//! process dies right after a failure.

use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Separator between captured stdout and stderr of a failed command.
pub const FAILURE_SEPARATOR: &str = "------";

/// Prefix of an echoed command.
pub const ECHO_PREFIX: &str = ">>> ";

/// Append-only diagnostic sink.
pub struct Transcript {
    sink: Box<dyn Write + Send>,
    path: Option<PathBuf>,
    write_failed: bool,
}

impl Transcript {
    /// Create (truncating) the transcript file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            sink: Box::new(LineWriter::new(file)),
            path: Some(path.to_path_buf()),
            write_failed: false,
        })
    }

    /// Transcript over an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(writer),
            path: None,
            write_failed: false,
        }
    }

    /// Transcript that drops everything.
    pub fn discard() -> Self {
        Self::from_writer(io::sink())
    }

    /// File backing the transcript, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Human-readable location for error messages.
    pub fn location(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => "<in-memory>".to_string(),
        }
    }

    /// Echo a command about to run.
    pub fn echo(&mut self, command: &str) {
        self.write_line(format_args!("{ECHO_PREFIX}{command}"));
    }

    /// Append one line of text.
    pub fn line(&mut self, text: &str) {
        self.write_line(format_args!("{text}"));
    }

    /// Captured output of a failed command.
    pub fn failure(&mut self, stdout: &str, stderr: &str) {
        self.write_line(format_args!("{stdout}"));
        self.write_line(format_args!("{FAILURE_SEPARATOR}"));
        self.write_line(format_args!("{stderr}"));
    }

    fn write_line(&mut self, args: std::fmt::Arguments<'_>) {
        let result = self
            .sink
            .write_fmt(args)
            .and_then(|()| self.sink.write_all(b"\n"))
            .and_then(|()| self.sink.flush());
        if let Err(e) = result {
            // Warn once; the transcript is diagnostics only.
            if !self.write_failed {
                warn!("Transcript {} write failed: {e}", self.location());
                self.write_failed = true;
            }
        }
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("path", &self.path)
            .field("write_failed", &self.write_failed)
            .finish()
    }
}

/// Cloneable in-memory writer, for hosts that keep the transcript in memory.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// New empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Contents split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
