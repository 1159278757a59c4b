//! Drawport Core Library
//!
//! Platform-agnostic data model and export logic for turning a whiteboard
//! drawing into a PDF: drawing elements, scenes, annotation derivation,
//! color naming and export configuration.

pub mod annotation;
pub mod element;
pub mod export;
pub mod files;
pub mod palette;
pub mod scene;

pub use annotation::{AnnotationKind, AnnotationRecord, derive_annotations};
pub use element::{DrawingElement, ElementKind};
pub use export::{
    AnnotationLayout, ConfigError, DEFAULT_EXPORT_PADDING, EXPORT_SCALES, ExportConfig,
};
pub use files::{BinaryFile, BinaryFiles, FileError};
pub use palette::{ColorNamer, PaletteNamer, UNKNOWN_COLOR, describe_color, parse_hex_color};
pub use scene::{AppState, Scene, SceneError};

use std::future::Future;
use std::pin::Pin;

/// Boxed future for async collaborator calls (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
