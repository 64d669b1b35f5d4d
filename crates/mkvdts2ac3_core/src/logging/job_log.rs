//! Per-container conversion transcript.
//!
//! Each input file gets its own [`JobLog`]. Every message is emitted as a
//! `tracing` event (so the terminal sees it at the right level) and, when
//! file logging is enabled, appended to `<title>.log` in the configured
//! directory with a timestamp and a level prefix.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, MessagePrefix};

/// Transcript logger for one input container.
pub struct JobLog {
    /// Container title (used in the transcript filename).
    stem: String,
    /// Path of the transcript file, when file logging is on.
    log_path: Option<PathBuf>,
    /// Buffered transcript writer.
    writer: Mutex<Option<BufWriter<File>>>,
    config: LogConfig,
}

impl JobLog {
    /// Create a logger for a container.
    ///
    /// When the config names a directory, the transcript file
    /// `<stem>.log` is created there (the directory is created as needed).
    pub fn new(stem: impl Into<String>, config: LogConfig) -> std::io::Result<Self> {
        let stem = stem.into();

        let (log_path, writer) = match &config.file_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.log", sanitize_filename(&stem)));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            stem,
            log_path,
            writer: Mutex::new(writer),
            config,
        })
    }

    /// Create a logger with no transcript file (terminal output only).
    pub fn detached(stem: impl Into<String>, config: LogConfig) -> Self {
        Self {
            stem: stem.into(),
            log_path: None,
            writer: Mutex::new(None),
            config: LogConfig {
                file_dir: None,
                ..config
            },
        }
    }

    /// The container title this log belongs to.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Path of the transcript file, when file logging is on.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.record(MessagePrefix::None, message);
    }

    /// Log a debug message (shown with `--verbose`).
    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
        self.record(MessagePrefix::Debug, message);
    }

    /// Log a warning.
    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        self.record(MessagePrefix::Warning, message);
    }

    /// Log an error.
    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.record(MessagePrefix::Error, message);
    }

    /// Log a command being dispatched.
    pub fn command(&self, command_line: &str) {
        let msg = MessagePrefix::Command.format(command_line);
        tracing::info!("{}", msg);
        self.record(MessagePrefix::None, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        tracing::info!("{}", msg);
        self.record(MessagePrefix::None, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        tracing::info!("{}", message);
        self.record(MessagePrefix::Success, message);
    }

    /// Append a line to the transcript file (no-op when detached).
    fn record(&self, prefix: MessagePrefix, message: &str) {
        let mut guard = self.writer.lock();
        let Some(writer) = guard.as_mut() else {
            return;
        };

        let line = prefix.format(message);
        let result = if self.config.timestamps {
            let stamp = Local::now().format("%H:%M:%S");
            writeln!(writer, "[{}] {}", stamp, line)
        } else {
            writeln!(writer, "{}", line)
        };
        // Transcript trouble must not interrupt a conversion.
        let _ = result;
    }

    /// Flush the transcript file.
    pub fn flush(&self) {
        if let Some(writer) = self.writer.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    /// Close the transcript and release the file handle.
    pub fn close(&self) {
        self.flush();
        *self.writer.lock() = None;
    }
}

impl Drop for JobLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a container title for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}
