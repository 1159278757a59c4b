//! Native save dialog sink.

use super::{DocumentSink, SaveError, SaveResult};
use drawport_core::BoxFuture;
use std::fs;

/// Asks the user where to save each document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogSink;

impl DialogSink {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSink for DialogSink {
    fn save<'a>(&'a self, bytes: Vec<u8>, file_name: &'a str) -> BoxFuture<'a, SaveResult<()>> {
        Box::pin(async move {
            let dialog = rfd::AsyncFileDialog::new()
                .set_title("Export PDF")
                .set_file_name(file_name)
                .add_filter("PDF Document", &["pdf"]);
            let handle = dialog.save_file().await.ok_or(SaveError::Cancelled)?;
            let path = handle.path().to_path_buf();
            fs::write(&path, bytes).map_err(|e| {
                SaveError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Exported PDF to: {:?}", path);
            Ok(())
        })
    }
}
