//! Move log written next to the organized files.
//!
//! The organizer reports every move and every failure to a [`LogSink`]. The
//! sink is opened when the organizer is built and must be closed explicitly;
//! closing more than once is harmless.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

/// Receives messages about moves performed by the executor.
pub trait LogSink {
    /// Records a successful step.
    fn info(&mut self, message: &str);

    /// Records a failed step.
    fn error(&mut self, message: &str);

    /// Releases any underlying resource. Must be idempotent.
    fn close(&mut self);
}

/// Appends timestamped lines to `tidydir_<YYYYMMDD_HHMMSS>.log`.
///
/// Lines look like `2024-03-09 14:30:52,123 - INFO - Moved: a.jpg → Images/a.jpg`.
/// Every line is also forwarded to `tracing`.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    writer: Option<LineWriter<File>>,
}

impl FileLogSink {
    /// Opens a new log file inside `log_dir`, creating the directory if needed,
    /// and writes the opening line.
    pub fn open(log_dir: &Path, source_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;

        let file_name = format!("tidydir_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        let path = log_dir.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut sink = Self {
            path,
            writer: Some(LineWriter::new(file)),
        };
        sink.info(&format!("TidyDir logging started for {}", source_dir.display()));
        Ok(sink)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn write_line(&mut self, level: &str, message: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        if let Err(e) = writeln!(writer, "{timestamp} - {level} - {message}") {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write to log file");
        }
    }
}

impl LogSink for FileLogSink {
    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
        self.write_line("INFO", message);
    }

    fn error(&mut self, message: &str) {
        tracing::error!("{message}");
        self.write_line("ERROR", message);
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush log file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_log_file_with_opening_line() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut sink = FileLogSink::open(temp_dir.path(), Path::new("/src")).expect("open");
        sink.close();

        let name = sink.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tidydir_"));
        assert!(name.ends_with(".log"));

        let content = fs::read_to_string(sink.path()).expect("Failed to read log");
        assert!(content.contains(" - INFO - TidyDir logging started for /src"));
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_dir = temp_dir.path().join("nested").join("target");
        let mut sink = FileLogSink::open(&log_dir, Path::new("/src")).expect("open");
        assert!(sink.path().starts_with(&log_dir));
        assert!(sink.path().exists());
        sink.close();
    }

    #[test]
    fn test_messages_are_written_with_levels() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut sink = FileLogSink::open(temp_dir.path(), Path::new("/src")).expect("open");
        sink.info("Moved: a → b");
        sink.error("Failed to move c: denied");
        sink.close();

        let content = fs::read_to_string(sink.path()).expect("Failed to read log");
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(" - INFO - Moved: a → b"));
        assert!(lines[2].ends_with(" - ERROR - Failed to move c: denied"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut sink = FileLogSink::open(temp_dir.path(), Path::new("/src")).expect("open");
        sink.close();
        sink.close();
        assert!(sink.is_closed());

        // Writes after close are dropped.
        sink.info("ignored");
        let content = fs::read_to_string(sink.path()).expect("Failed to read log");
        assert!(!content.contains("ignored"));
    }
}
