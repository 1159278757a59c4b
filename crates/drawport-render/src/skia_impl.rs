//! tiny-skia rasterizer implementation.

use crate::raster::RasterImage;
use crate::renderer::{CanvasSize, RasterRequest, Rasterizer, RenderError, RenderResult, canvas_size};
use drawport_core::{BinaryFiles, BoxFuture, DrawingElement, ElementKind, parse_hex_color};
use kurbo::{BezPath, Ellipse, PathEl, Point, Rect, Shape as KurboShape, Vec2};
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

/// Stroke width used when an element does not specify one.
const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Arrowhead wing length, in scene units.
const ARROWHEAD_LENGTH: f64 = 20.0;

/// Angle between the arrow shaft and each arrowhead wing.
const ARROWHEAD_ANGLE: f64 = 25.0 * std::f64::consts::PI / 180.0;

/// Flattening tolerance for curves.
const TOLERANCE: f64 = 0.1;

/// CPU rasterizer backed by tiny-skia.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkiaRasterizer;

impl SkiaRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Render synchronously.
    pub fn render(&self, request: &RasterRequest<'_>) -> RenderResult<RasterImage> {
        let options = &request.options;
        let size = canvas_size(request.elements, options)?;
        let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
            RenderError::RenderFailed(format!(
                "could not allocate {}x{} canvas",
                size.width, size.height
            ))
        })?;

        if options.export_background {
            let background = parse_hex_color(&options.view_background_color)
                .map(|c| to_skia_color(c, 1.0))
                .unwrap_or(Color::WHITE);
            pixmap.fill(background);
        }

        let base = base_transform(&size);
        for element in request.elements.iter().filter(|e| !e.is_deleted) {
            draw_element(&mut pixmap, element, request.files, base);
        }

        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        let mut image = RasterImage::new(size.width, size.height, pixels)?;
        if options.dark_mode {
            image.apply_dark_mode_filter();
        }

        log::debug!(
            "Rasterized {} elements into {}x{} (scale {:.2})",
            request.elements.len(),
            size.width,
            size.height,
            size.scale
        );
        Ok(image)
    }
}

impl Rasterizer for SkiaRasterizer {
    fn rasterize<'a>(&'a self, request: RasterRequest<'a>) -> BoxFuture<'a, RenderResult<RasterImage>> {
        Box::pin(async move { self.render(&request) })
    }
}

/// Scene-to-canvas transform.
fn base_transform(size: &CanvasSize) -> Transform {
    let scale = size.scale as f32;
    Transform::from_row(
        scale,
        0.0,
        0.0,
        scale,
        -(size.origin.x as f32) * scale,
        -(size.origin.y as f32) * scale,
    )
}

/// Element transform: rotation about the element center, then scene-to-canvas.
fn element_transform(element: &DrawingElement, base: Transform) -> Transform {
    if element.angle == 0.0 {
        return base;
    }
    let center = element.frame().center();
    Transform::from_rotate_at(
        element.angle.to_degrees() as f32,
        center.x as f32,
        center.y as f32,
    )
    .post_concat(base)
}

fn to_skia_color(color: peniko::Color, opacity: f64) -> Color {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, alpha)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn diamond_path(frame: Rect) -> BezPath {
    let center = frame.center();
    let mut path = BezPath::new();
    path.move_to(Point::new(center.x, frame.y0));
    path.line_to(Point::new(frame.x1, center.y));
    path.line_to(Point::new(center.x, frame.y1));
    path.line_to(Point::new(frame.x0, center.y));
    path.close_path();
    path
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
    }
    path
}

/// Two wing strokes at the end of the last segment.
fn arrowhead_path(points: &[Point]) -> Option<BezPath> {
    let [.., from, tip] = points else {
        return None;
    };
    let shaft: Vec2 = *tip - *from;
    let length = shaft.hypot();
    if length < f64::EPSILON {
        return None;
    }
    let wing = ARROWHEAD_LENGTH.min(length / 2.0);
    let back = -shaft / length * wing;

    let mut path = BezPath::new();
    for angle in [ARROWHEAD_ANGLE, -ARROWHEAD_ANGLE] {
        let (sin, cos) = angle.sin_cos();
        let rotated = Vec2::new(back.x * cos - back.y * sin, back.x * sin + back.y * cos);
        path.move_to(*tip + rotated);
        path.line_to(*tip);
    }
    Some(path)
}

fn draw_element(pixmap: &mut Pixmap, element: &DrawingElement, files: &BinaryFiles, base: Transform) {
    let transform = element_transform(element, base);
    let opacity = element.opacity / 100.0;
    let frame = element.frame();

    let (outline, filled) = match element.kind() {
        ElementKind::Rectangle | ElementKind::Square => (frame.to_path(TOLERANCE), true),
        ElementKind::Ellipse => (Ellipse::from_rect(frame).to_path(TOLERANCE), true),
        ElementKind::Diamond | ElementKind::Rhombus => (diamond_path(frame), true),
        ElementKind::Line | ElementKind::Arrow | ElementKind::Freedraw => {
            let points = element.absolute_points();
            let mut path = polyline_path(&points);
            if element.kind() == ElementKind::Arrow {
                if let Some(head) = arrowhead_path(&points) {
                    path.extend(head.elements().iter().copied());
                }
            }
            (path, false)
        }
        ElementKind::Image => {
            draw_image(pixmap, element, files, transform, opacity);
            return;
        }
        ElementKind::Text => {
            log::debug!("Skipping text element {:?}: no font backend", element.id);
            return;
        }
        ElementKind::Other(tag) => {
            log::debug!("Skipping unsupported element type {tag:?}");
            return;
        }
    };

    let Some(path) = to_skia_path(&outline) else {
        return;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;

    if filled {
        if let Some(fill) = element.background_color.as_deref().and_then(parse_hex_color) {
            paint.set_color(to_skia_color(fill, opacity));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    let stroke_color = element
        .stroke_color
        .as_deref()
        .and_then(parse_hex_color)
        .unwrap_or(peniko::Color::from_rgba8(0, 0, 0, 255));
    paint.set_color(to_skia_color(stroke_color, opacity));
    let stroke = Stroke {
        width: element.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH) as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}

fn draw_image(
    pixmap: &mut Pixmap,
    element: &DrawingElement,
    files: &BinaryFiles,
    transform: Transform,
    opacity: f64,
) {
    let Some(file) = element.file_id.as_ref().and_then(|id| files.get(id)) else {
        log::warn!("Image element {:?} references a missing file", element.id);
        return;
    };
    let decoded = match file
        .decode()
        .map_err(|e| e.to_string())
        .and_then(|bytes| ::image::load_from_memory(&bytes).map_err(|e| e.to_string()))
    {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            log::warn!("Failed to decode image {:?}: {}", file.id, e);
            return;
        }
    };

    let (img_w, img_h) = decoded.dimensions();
    let mut data = decoded.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    let Some(image) = IntSize::from_wh(img_w, img_h).and_then(|size| Pixmap::from_vec(data, size)) else {
        return;
    };

    let frame = element.frame();
    let target_w = if frame.width() > 0.0 { frame.width() } else { img_w as f64 };
    let target_h = if frame.height() > 0.0 { frame.height() } else { img_h as f64 };
    let placement = Transform::from_row(
        (target_w / img_w as f64) as f32,
        0.0,
        0.0,
        (target_h / img_h as f64) as f32,
        frame.x0 as f32,
        frame.y0 as f32,
    )
    .post_concat(transform);

    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0) as f32,
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, placement, None);
}
