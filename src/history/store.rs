//! Pluggable persistence for the win-history blob.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use derive_more::{Display, Error};
use derive_new::new;
use tracing::{debug, instrument};

/// Persistence error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("History store error: {} at {}:{}", message, file, line)]
pub struct HistoryError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl HistoryError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<io::Error> for HistoryError {
    #[track_caller]
    fn from(err: io::Error) -> Self {
        Self::new(format!("I/O error: {err}"))
    }
}

impl From<serde_json::Error> for HistoryError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Serialization error: {err}"))
    }
}

/// Storage slot for the serialized history document.
///
/// One fixed key per store; the ledger never addresses more than a single
/// blob.
pub trait HistoryStore {
    /// Reads the stored blob. `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<String>, HistoryError>;
    /// Replaces the stored blob.
    fn save(&self, blob: &str) -> Result<(), HistoryError>;
    /// Removes the stored blob.
    fn clear(&self) -> Result<(), HistoryError>;
}

/// File-backed store holding the blob as one JSON document.
#[derive(Debug, Clone, new)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl HistoryStore for FileHistoryStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<String>, HistoryError> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No stored history yet");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, blob), fields(path = %self.path.display()))]
    fn save(&self, blob: &str) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), HistoryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryHistoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Option<String>, HistoryError> {
        let guard = self
            .blob
            .lock()
            .map_err(|_| HistoryError::new("Store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, blob: &str) -> Result<(), HistoryError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| HistoryError::new("Store lock poisoned"))?;
        *guard = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| HistoryError::new("Store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
