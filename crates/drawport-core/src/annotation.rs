//! Annotation derivation: one textual record per drawing element.
//!
//! Annotations describe what the drawing contains (shape kind, size and
//! colors) so an exported document carries a readable summary next to the
//! rasterized picture.

use crate::element::{DrawingElement, ElementKind};
use serde::Serialize;

/// Background color recorded when an element has none.
pub const DEFAULT_BACKGROUND: &str = "transparent";

/// Stroke color recorded when an element has none.
pub const DEFAULT_STROKE: &str = "#000000";

/// Horizontal offset of inline annotation text from the scaled shape position.
pub const INLINE_OFFSET_X: f64 = 90.0 + 2.0;

/// Vertical offset of inline annotation text from the scaled shape position.
pub const INLINE_OFFSET_Y: f64 = 100.0 + 7.0;

/// Normalized kind of an annotated shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// The element kind was not recognized.
    #[default]
    #[serde(rename = "")]
    Unknown,
    Circle,
    Rectangle,
    Square,
    Diamond,
    Rhombus,
    Line,
    Arrow,
    Freedraw,
}

impl AnnotationKind {
    /// Normalized tag (empty for unrecognized kinds).
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationKind::Unknown => "",
            AnnotationKind::Circle => "circle",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Square => "square",
            AnnotationKind::Diamond => "diamond",
            AnnotationKind::Rhombus => "rhombus",
            AnnotationKind::Line => "line",
            AnnotationKind::Arrow => "arrow",
            AnnotationKind::Freedraw => "freedraw",
        }
    }
}

/// Derived description of one drawing element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub kind: AnnotationKind,
    pub x: f64,
    pub y: f64,
    /// Set for circles only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub background_color: String,
    pub stroke_color: String,
}

impl AnnotationRecord {
    fn blank(element: &DrawingElement) -> Self {
        Self {
            kind: AnnotationKind::Unknown,
            x: element.x,
            y: element.y,
            radius: None,
            width: None,
            height: None,
            description: None,
            background_color: element
                .background_color
                .clone()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            stroke_color: element
                .stroke_color
                .clone()
                .unwrap_or_else(|| DEFAULT_STROKE.to_string()),
        }
    }

    /// Position of the record's text when written next to its shape on the
    /// drawing page, given canvas-to-page scale factors.
    pub fn inline_position(&self, scale_x: f64, scale_y: f64) -> (f64, f64) {
        (
            self.x * scale_x + INLINE_OFFSET_X,
            self.y * scale_y + INLINE_OFFSET_Y,
        )
    }
}

/// Derive one annotation per element, in input order.
///
/// Never fails. Elements of an unrecognized kind still yield a record with
/// [`AnnotationKind::Unknown`] and no description; a warning is logged for
/// each of them.
pub fn derive_annotations(elements: &[DrawingElement]) -> Vec<AnnotationRecord> {
    elements.iter().map(annotate).collect()
}

fn annotate(element: &DrawingElement) -> AnnotationRecord {
    let mut record = AnnotationRecord::blank(element);

    let (kind, description) = match element.kind() {
        ElementKind::Ellipse => {
            record.radius = Some(element.width.unwrap_or(0.0) / 2.0);
            (AnnotationKind::Circle, "It has a circle")
        }
        ElementKind::Rectangle => {
            record.width = element.width;
            record.height = element.height;
            (AnnotationKind::Rectangle, "It has a rectangle")
        }
        ElementKind::Square => {
            record.width = element.width;
            record.height = element.height;
            (AnnotationKind::Square, "It has a square")
        }
        ElementKind::Diamond => {
            record.width = element.width;
            record.height = element.height;
            (AnnotationKind::Diamond, "It has a diamond")
        }
        ElementKind::Rhombus => {
            record.width = element.width;
            record.height = element.height;
            (AnnotationKind::Rhombus, "It has a rhombus")
        }
        ElementKind::Line => {
            record.width = element.width;
            (AnnotationKind::Line, "It has a line")
        }
        ElementKind::Arrow => {
            record.width = element.width;
            (AnnotationKind::Arrow, "It has an arrow")
        }
        ElementKind::Freedraw => (AnnotationKind::Freedraw, "It has a freehand drawing"),
        other => {
            log::warn!("Unknown element type: {}", other.tag());
            return record;
        }
    };

    record.kind = kind;
    record.description = Some(description);
    record
}
