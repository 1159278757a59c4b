//! Drawing elements as they appear in a whiteboard scene.

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Shape-kind tag of a drawing element.
///
/// Parsing never fails: tags this crate does not know about are kept
/// verbatim in [`ElementKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Ellipse,
    Rectangle,
    Square,
    Diamond,
    Rhombus,
    Line,
    Arrow,
    Freedraw,
    Text,
    Image,
    Other(String),
}

impl ElementKind {
    /// The scene-format tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Ellipse => "ellipse",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Square => "square",
            ElementKind::Diamond => "diamond",
            ElementKind::Rhombus => "rhombus",
            ElementKind::Line => "line",
            ElementKind::Arrow => "arrow",
            ElementKind::Freedraw => "freedraw",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Other(tag) => tag,
        }
    }

    /// Whether the element geometry is a polyline stored in `points`.
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            ElementKind::Line | ElementKind::Arrow | ElementKind::Freedraw
        )
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        match tag {
            "ellipse" => ElementKind::Ellipse,
            "rectangle" => ElementKind::Rectangle,
            "square" => ElementKind::Square,
            "diamond" => ElementKind::Diamond,
            "rhombus" => ElementKind::Rhombus,
            "line" => ElementKind::Line,
            "arrow" => ElementKind::Arrow,
            "freedraw" => ElementKind::Freedraw,
            "text" => ElementKind::Text,
            "image" => ElementKind::Image,
            other => ElementKind::Other(other.to_string()),
        }
    }
}

/// One shape in the whiteboard document.
///
/// Mirrors the scene JSON (camelCase keys). Unknown keys are ignored so
/// scenes written by newer editors still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingElement {
    #[serde(default)]
    pub id: String,
    /// Raw shape-kind tag, see [`DrawingElement::kind`].
    #[serde(rename = "type")]
    pub element_type: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in radians around the element center.
    #[serde(default)]
    pub angle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Opacity in percent (0-100).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<serde_json::Value>,
    /// Polyline points relative to (`x`, `y`), for lines, arrows and freedraw.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<[f64; 2]>,
    /// Key into the scene's binary files, for image elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

fn default_opacity() -> f64 {
    100.0
}

impl DrawingElement {
    /// Create an element of the given kind at a position, with no size or colors.
    pub fn new(element_type: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: String::new(),
            element_type: element_type.into(),
            x,
            y,
            width: None,
            height: None,
            angle: 0.0,
            stroke_color: None,
            background_color: None,
            stroke_width: None,
            opacity: default_opacity(),
            text: None,
            font_size: None,
            font_family: None,
            points: Vec::new(),
            file_id: None,
            is_deleted: false,
        }
    }

    /// Set the element id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set width and height.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set background and stroke colors.
    pub fn with_colors(mut self, background: &str, stroke: &str) -> Self {
        self.background_color = Some(background.to_string());
        self.stroke_color = Some(stroke.to_string());
        self
    }

    /// Set the relative polyline points.
    pub fn with_points(mut self, points: Vec<[f64; 2]>) -> Self {
        self.points = points;
        self
    }

    /// Parsed shape kind.
    pub fn kind(&self) -> ElementKind {
        ElementKind::from(self.element_type.as_str())
    }

    /// Top-left position.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Absolute polyline points.
    pub fn absolute_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|[px, py]| Point::new(self.x + px, self.y + py))
            .collect()
    }

    /// Unrotated box spanned by position and size (absent sizes count as 0).
    pub fn frame(&self) -> Rect {
        let width = self.width.unwrap_or(0.0);
        let height = self.height.unwrap_or(0.0);
        Rect::new(self.x, self.y, self.x + width, self.y + height).abs()
    }

    /// Axis-aligned bounds in scene coordinates, rotation included.
    pub fn bounds(&self) -> Rect {
        let points = self.absolute_points();
        let frame = if self.kind().is_linear() && !points.is_empty() {
            points
                .iter()
                .skip(1)
                .fold(Rect::from_points(points[0], points[0]), |acc, p| {
                    acc.union_pt(*p)
                })
        } else {
            self.frame()
        };

        if self.angle == 0.0 {
            frame
        } else {
            Affine::rotate_about(self.angle, frame.center()).transform_rect_bbox(frame)
        }
    }
}

/// Union of the bounds of all non-deleted elements, or `None` if there are none.
pub fn common_bounds(elements: &[DrawingElement]) -> Option<Rect> {
    elements
        .iter()
        .filter(|e| !e.is_deleted)
        .map(DrawingElement::bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}
