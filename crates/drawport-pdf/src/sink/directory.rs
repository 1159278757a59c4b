//! Directory-backed document sink for native platforms.

use super::{DocumentSink, SaveError, SaveResult, sanitize_file_name};
use drawport_core::BoxFuture;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes documents into a directory.
pub struct DirectorySink {
    /// Directory documents are written to.
    base_path: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `base_path`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> SaveResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                SaveError::Io(format!("Failed to create output directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Path a document with this file name is written to.
    pub fn document_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(sanitize_file_name(file_name))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl DocumentSink for DirectorySink {
    fn save<'a>(&'a self, bytes: Vec<u8>, file_name: &'a str) -> BoxFuture<'a, SaveResult<()>> {
        let path = self.document_path(file_name);
        Box::pin(async move {
            fs::write(&path, bytes).map_err(|e| {
                SaveError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Saved {}", path.display());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path()).unwrap();

        pollster::block_on(sink.save(b"%PDF".to_vec(), "board.pdf")).unwrap();
        assert_eq!(fs::read(dir.path().join("board.pdf")).unwrap(), b"%PDF");
    }

    #[test]
    fn test_directory_sink_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("pdf");
        let sink = DirectorySink::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.base_path(), nested.as_path());
    }

    #[test]
    fn test_directory_sink_sanitizes_name() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path()).unwrap();

        pollster::block_on(sink.save(vec![1], "sub/dir:name.pdf")).unwrap();
        assert!(dir.path().join("sub_dir_name.pdf").exists());
    }
}
