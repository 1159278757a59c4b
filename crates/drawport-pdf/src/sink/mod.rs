//! Document sinks: where finished PDFs are persisted.

mod directory;
mod memory;

#[cfg(feature = "dialog")]
mod dialog;

pub use directory::DirectorySink;
pub use memory::MemorySink;

#[cfg(feature = "dialog")]
pub use dialog::DialogSink;

use drawport_core::BoxFuture;
use thiserror::Error;

/// Save errors.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Save cancelled by user")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(String),
    #[error("Save error: {0}")]
    Other(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Trait for persisting a finished document.
///
/// Implementations may write to disk, keep bytes in memory, or ask the
/// user where to save through a native dialog.
pub trait DocumentSink: Send + Sync {
    /// Persist `bytes` under `file_name`.
    fn save<'a>(&'a self, bytes: Vec<u8>, file_name: &'a str) -> BoxFuture<'a, SaveResult<()>>;
}

/// Replace characters that are unsafe in file names.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.trim_matches('.').is_empty() {
        "export.pdf".to_string()
    } else {
        safe
    }
}
