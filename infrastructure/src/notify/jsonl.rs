//! JSONL audit-trail writer for review events.
//!
//! Each event is serialized as a single JSON line and appended to the file
//! via a buffered writer. Flushes per event: the audit log is append-only
//! and must survive a crash mid-session.

use accord_application::ports::notifier::{Notifier, ReviewEvent};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Audit notifier that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlNotifier {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlNotifier {
    /// Open the audit log at the given path, appending to an existing file.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    "Could not create audit log directory {}: {}",
                    parent.display(),
                    e
                );
                return None;
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the audit log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Notifier for JsonlNotifier {
    fn notify(&self, event: ReviewEvent) {
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlNotifier {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
