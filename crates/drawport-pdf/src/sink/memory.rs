//! In-memory document sink.

use super::{DocumentSink, SaveError, SaveResult};
use drawport_core::BoxFuture;
use std::sync::RwLock;

/// Keeps saved documents in memory, for tests and previews.
#[derive(Default)]
pub struct MemorySink {
    documents: RwLock<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of saved documents, in save order.
    pub fn file_names(&self) -> Vec<String> {
        self.documents
            .read()
            .map(|docs| docs.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    /// Bytes of the most recent document saved under `file_name`.
    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        let docs = self.documents.read().ok()?;
        docs.iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    /// Number of saves performed.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentSink for MemorySink {
    fn save<'a>(&'a self, bytes: Vec<u8>, file_name: &'a str) -> BoxFuture<'a, SaveResult<()>> {
        Box::pin(async move {
            let mut docs = self
                .documents
                .write()
                .map_err(|e| SaveError::Other(format!("Lock error: {}", e)))?;
            docs.push((file_name.to_string(), bytes));
            Ok(())
        })
    }
}
