//! Drawport PDF Library
//!
//! Composes rasterized drawings and their annotations into A4 PDF
//! documents and hands them to a document sink.

mod composer;
mod dialog;
mod document;
pub mod sink;

pub use composer::{ComposedPdf, ExportError, ExportReport, PdfExporter, annotation_line, compose_pdf};
pub use dialog::ExportDialog;
pub use document::{Font, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PdfBuilder, TextStyle};
pub use sink::{DirectorySink, DocumentSink, MemorySink, SaveError, SaveResult};

#[cfg(feature = "dialog")]
pub use sink::DialogSink;
