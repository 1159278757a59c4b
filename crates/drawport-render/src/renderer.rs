//! Rasterizer trait abstraction.

use crate::raster::RasterImage;
use drawport_core::element::common_bounds;
use drawport_core::{BinaryFiles, BoxFuture, DrawingElement, ExportConfig};
use kurbo::{Point, Rect};
use thiserror::Error;

/// Largest canvas side, in pixels, a rasterizer will allocate.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Rasterizer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Canvas too big: {width}x{height} exceeds {}px per side", MAX_CANVAS_SIDE)]
    CanvasTooBig { width: u32, height: u32 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for rasterizer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Rendering parameters threaded through from the export configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Paint the view background behind the drawing.
    pub export_background: bool,
    /// Background color (CSS hex).
    pub view_background_color: String,
    /// Apply the dark-mode filter to the finished image.
    pub dark_mode: bool,
    /// Pixels per scene unit.
    pub scale: f64,
    /// Padding around the drawing, in scene units.
    pub padding: f64,
    /// Fit the larger canvas side into this many pixels (preview).
    pub max_width_or_height: Option<u32>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            export_background: true,
            view_background_color: "#ffffff".to_string(),
            dark_mode: false,
            scale: 1.0,
            padding: drawport_core::DEFAULT_EXPORT_PADDING,
            max_width_or_height: None,
        }
    }
}

impl RasterOptions {
    /// Options matching an export configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            export_background: config.export_background,
            view_background_color: config.view_background_color.clone(),
            dark_mode: config.export_dark_mode,
            scale: config.export_scale() as f64,
            padding: config.padding,
            max_width_or_height: None,
        }
    }

    /// Cap the larger canvas side.
    pub fn with_max_width_or_height(mut self, max: Option<u32>) -> Self {
        self.max_width_or_height = max;
        self
    }
}

/// Everything a rasterizer needs for one image.
#[derive(Debug, Clone)]
pub struct RasterRequest<'a> {
    pub elements: &'a [DrawingElement],
    pub files: &'a BinaryFiles,
    pub options: RasterOptions,
}

impl<'a> RasterRequest<'a> {
    pub fn new(elements: &'a [DrawingElement], files: &'a BinaryFiles, options: RasterOptions) -> Self {
        Self {
            elements,
            files,
            options,
        }
    }
}

/// Pixel size of the canvas for a request, and how scene coordinates map onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
    /// Pixels per scene unit.
    pub scale: f64,
    /// Scene coordinate drawn at the canvas' top-left pixel.
    pub origin: Point,
}

/// Compute the canvas for a set of elements.
///
/// The canvas spans the elements' common bounds plus padding on every side.
/// When `max_width_or_height` is smaller than the larger side the image is
/// scaled down to fit it, otherwise the configured scale applies.
pub fn canvas_size(elements: &[DrawingElement], options: &RasterOptions) -> RenderResult<CanvasSize> {
    let bounds = common_bounds(elements).unwrap_or(Rect::ZERO);
    let padded = bounds.inflate(options.padding, options.padding);
    let larger_side = padded.width().max(padded.height());

    let scale = match options.max_width_or_height {
        Some(max) if (max as f64) < larger_side => max as f64 / larger_side,
        _ => options.scale,
    };

    let width = (padded.width() * scale).round().max(1.0);
    let height = (padded.height() * scale).round().max(1.0);
    if width > MAX_CANVAS_SIDE as f64 || height > MAX_CANVAS_SIDE as f64 {
        return Err(RenderError::CanvasTooBig {
            width: width.min(u32::MAX as f64) as u32,
            height: height.min(u32::MAX as f64) as u32,
        });
    }

    Ok(CanvasSize {
        width: width as u32,
        height: height as u32,
        scale,
        origin: padded.origin(),
    })
}

/// Trait for rasterization backends.
///
/// Implementations render drawing elements into an RGBA image. Rendering
/// may be deferred (GPU readback, worker threads), hence the future.
pub trait Rasterizer: Send + Sync {
    /// Render the request into an image.
    fn rasterize<'a>(&'a self, request: RasterRequest<'a>) -> BoxFuture<'a, RenderResult<RasterImage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> DrawingElement {
        DrawingElement::new("rectangle", x, y).with_size(w, h)
    }

    #[test]
    fn test_canvas_size_includes_padding() {
        let options = RasterOptions::default();
        let size = canvas_size(&[rect(100.0, 50.0, 200.0, 100.0)], &options).unwrap();
        assert_eq!((size.width, size.height), (220, 120));
        assert!((size.origin.x - 90.0).abs() < f64::EPSILON);
        assert!((size.origin.y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_size_applies_scale() {
        let options = RasterOptions {
            scale: 2.0,
            ..RasterOptions::default()
        };
        let size = canvas_size(&[rect(0.0, 0.0, 80.0, 30.0)], &options).unwrap();
        assert_eq!((size.width, size.height), (200, 100));
    }

    #[test]
    fn test_max_width_or_height_caps_larger_side() {
        let options = RasterOptions {
            scale: 3.0,
            ..RasterOptions::default()
        }
        .with_max_width_or_height(Some(110));
        let size = canvas_size(&[rect(0.0, 0.0, 200.0, 80.0)], &options).unwrap();
        assert_eq!(size.width, 110);
        assert_eq!(size.height, 50);
        assert!((size.scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_small_content_keeps_configured_scale_under_cap() {
        let options = RasterOptions {
            scale: 2.0,
            ..RasterOptions::default()
        }
        .with_max_width_or_height(Some(1000));
        let size = canvas_size(&[rect(0.0, 0.0, 30.0, 30.0)], &options).unwrap();
        assert_eq!((size.width, size.height), (100, 100));
    }

    #[test]
    fn test_empty_scene_is_padding_only() {
        let size = canvas_size(&[], &RasterOptions::default()).unwrap();
        assert_eq!((size.width, size.height), (20, 20));
    }

    #[test]
    fn test_deleted_elements_do_not_grow_canvas() {
        let mut deleted = rect(1000.0, 1000.0, 50.0, 50.0);
        deleted.is_deleted = true;
        let size = canvas_size(
            &[rect(100.0, 50.0, 200.0, 100.0), deleted],
            &RasterOptions::default(),
        )
        .unwrap();
        assert_eq!((size.width, size.height), (220, 120));
    }

    #[test]
    fn test_canvas_too_big() {
        let options = RasterOptions {
            scale: 3.0,
            ..RasterOptions::default()
        };
        let result = canvas_size(&[rect(0.0, 0.0, 10_000.0, 10.0)], &options);
        assert!(matches!(result, Err(RenderError::CanvasTooBig { .. })));
    }
}
