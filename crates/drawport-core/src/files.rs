//! Binary files referenced by image elements.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors decoding a file payload.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Not a data URL")]
    NotDataUrl,
    #[error("Unsupported data URL encoding (expected base64)")]
    NotBase64,
    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A file embedded in the scene, stored as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryFile {
    #[serde(default)]
    pub id: String,
    pub mime_type: String,
    #[serde(rename = "dataURL")]
    pub data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
}

impl BinaryFile {
    /// Build a file from raw bytes, encoding them as a base64 data URL.
    pub fn from_bytes(id: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            id: id.into(),
            mime_type: mime_type.to_string(),
            data_url: format!("data:{};base64,{}", mime_type, BASE64.encode(bytes)),
            created: None,
        }
    }

    /// Decode the data URL payload.
    pub fn decode(&self) -> Result<Vec<u8>, FileError> {
        let rest = self
            .data_url
            .strip_prefix("data:")
            .ok_or(FileError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(FileError::NotDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(FileError::NotBase64);
        }
        Ok(BASE64.decode(payload.trim())?)
    }
}

/// Files keyed by file id.
pub type BinaryFiles = HashMap<String, BinaryFile>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_roundtrip() {
        let file = BinaryFile::from_bytes("f1", "image/png", &[1, 2, 3, 250]);
        assert!(file.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(file.decode().unwrap(), vec![1, 2, 3, 250]);
    }

    #[test]
    fn test_decode_rejects_plain_url() {
        let mut file = BinaryFile::from_bytes("f1", "image/png", &[1]);
        file.data_url = "https://example.com/a.png".to_string();
        assert!(matches!(file.decode(), Err(FileError::NotDataUrl)));

        file.data_url = "data:text/plain,hello".to_string();
        assert!(matches!(file.decode(), Err(FileError::NotBase64)));
    }

    #[test]
    fn test_deserialize_scene_file_entry() {
        let json = r#"{"mimeType":"image/png","id":"abc","dataURL":"data:image/png;base64,AAE=","created":1700000000000}"#;
        let file: BinaryFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.decode().unwrap(), vec![0, 1]);
    }
}
