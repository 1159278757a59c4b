//! PDF composition: drawing page plus optional annotation page.

use crate::document::{Font, PdfBuilder, TextStyle};
use crate::sink::{DocumentSink, SaveError};
use drawport_core::annotation::AnnotationRecord;
use drawport_core::palette::describe_color;
use drawport_core::{
    AnnotationLayout, BinaryFiles, ColorNamer, DrawingElement, ExportConfig, PaletteNamer, Scene,
    SceneError, derive_annotations,
};
use drawport_render::{RasterImage, RasterOptions, RasterRequest, Rasterizer, RenderError};
use thiserror::Error;

/// Left edge and top of the drawing on the first page, in millimetres.
const IMAGE_ORIGIN: (f64, f64) = (10.0, 10.0);

/// Drawing width on the first page, in millimetres.
const IMAGE_WIDTH: f64 = 190.0;

/// Height the inline layout maps the canvas onto, in millimetres.
const INLINE_PAGE_HEIGHT: f64 = 150.0;

const ANNOTATIONS_HEADING: &str = "Annotations";
const ANNOTATION_LEFT: f64 = 10.0;
const ANNOTATION_HEADING_Y: f64 = 20.0;
const ANNOTATION_FIRST_LINE_Y: f64 = 30.0;
const ANNOTATION_LINE_HEIGHT: f64 = 10.0;

/// Description used on the appendix page when a record has none.
const UNSURE_DESCRIPTION: &str = "Not Sure";

/// Description used in the inline layout when a record has none.
const INLINE_PLACEHOLDER: &str = "No text provided";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Save error: {0}")]
    Save(#[from] SaveError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub file_name: String,
    pub page_count: usize,
    pub annotation_count: usize,
    pub byte_len: usize,
}

/// A serialized document and its page count.
#[derive(Debug, Clone)]
pub struct ComposedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Exports drawings to PDF through a rasterizer and a document sink.
pub struct PdfExporter<R, S> {
    rasterizer: R,
    sink: S,
    namer: Box<dyn ColorNamer + Send + Sync>,
}

impl<R: Rasterizer, S: DocumentSink> PdfExporter<R, S> {
    /// Create an exporter naming colors with [`PaletteNamer`].
    pub fn new(rasterizer: R, sink: S) -> Self {
        Self {
            rasterizer,
            sink,
            namer: Box::new(PaletteNamer::new()),
        }
    }

    /// Replace the color namer.
    pub fn with_namer(mut self, namer: impl ColorNamer + Send + Sync + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Export `elements` to `{project_name}.pdf`.
    ///
    /// Never fails: any error is logged and nothing is saved.
    pub async fn export_to_pdf(&self, elements: &[DrawingElement], config: &ExportConfig, files: &BinaryFiles) {
        if let Err(err) = self.try_export_to_pdf(elements, config, files).await {
            log::error!("Error exporting to PDF: {err}");
        }
    }

    /// Export `elements`, reporting failures to the caller.
    pub async fn try_export_to_pdf(
        &self,
        elements: &[DrawingElement],
        config: &ExportConfig,
        files: &BinaryFiles,
    ) -> Result<ExportReport, ExportError> {
        let request = RasterRequest::new(elements, files, RasterOptions::from_config(config));
        let image = self.rasterizer.rasterize(request).await?;
        log::debug!("Rasterized drawing at {}x{}", image.width(), image.height());

        let annotations = config
            .export_with_annotations
            .then(|| derive_annotations(elements));
        let scene_json = if config.export_embed_scene {
            Some(embedded_scene(elements, config, files)?)
        } else {
            None
        };

        let composed = compose_pdf(
            &image,
            annotations.as_deref(),
            config,
            self.namer.as_ref(),
            scene_json.as_deref(),
        )?;

        let file_name = config.file_name();
        let report = ExportReport {
            file_name: file_name.clone(),
            page_count: composed.page_count,
            annotation_count: annotations.as_ref().map_or(0, Vec::len),
            byte_len: composed.bytes.len(),
        };
        self.sink.save(composed.bytes, &file_name).await?;
        log::info!(
            "Exported {} ({} page(s), {} bytes)",
            report.file_name,
            report.page_count,
            report.byte_len
        );
        Ok(report)
    }
}

/// Scene JSON carrying the exported elements and settings.
fn embedded_scene(elements: &[DrawingElement], config: &ExportConfig, files: &BinaryFiles) -> Result<String, SceneError> {
    let mut scene = Scene::new(elements.to_vec());
    scene.app_state = config.to_app_state();
    scene.files = files.clone();
    scene.to_json()
}

/// Lay out a rasterized drawing and its annotations as an A4 document.
///
/// With `annotations` set, the appendix layout adds a second page listing
/// one line per record, while the inline layout writes each description
/// next to its shape on the first page.
pub fn compose_pdf(
    image: &RasterImage,
    annotations: Option<&[AnnotationRecord]>,
    config: &ExportConfig,
    namer: &dyn ColorNamer,
    scene_json: Option<&str>,
) -> Result<ComposedPdf, ExportError> {
    let mut builder = PdfBuilder::new();
    builder.set_title(&config.project_name);

    let (left, top) = IMAGE_ORIGIN;
    builder.add_image(0, image, left, top, IMAGE_WIDTH, 0.0)?;

    if let Some(records) = annotations {
        match config.annotation_layout {
            AnnotationLayout::Appendix => write_appendix(&mut builder, records, namer),
            AnnotationLayout::Inline => {
                write_inline(&mut builder, records, image, config.export_dark_mode)
            }
        }
    }

    if let Some(json) = scene_json {
        let name = format!("{}.{}", config.project_name, Scene::SCENE_TYPE);
        builder.attach_file(&name, json.as_bytes().to_vec())?;
    }

    let page_count = builder.page_count();
    let bytes = builder.finish()?;
    Ok(ComposedPdf { bytes, page_count })
}

/// One appendix line, numbered from 1.
pub fn annotation_line(index: usize, record: &AnnotationRecord, namer: &dyn ColorNamer) -> String {
    format!(
        "{}. {} with the background color of {} and border color of {}",
        index + 1,
        record.description.unwrap_or(UNSURE_DESCRIPTION),
        describe_color(namer, Some(&record.background_color)),
        describe_color(namer, Some(&record.stroke_color)),
    )
}

fn write_appendix(builder: &mut PdfBuilder, records: &[AnnotationRecord], namer: &dyn ColorNamer) {
    let page = builder.add_page();
    let style = TextStyle::default();
    builder.add_text(page, ANNOTATIONS_HEADING, ANNOTATION_LEFT, ANNOTATION_HEADING_Y, style);

    // No pagination: lines past the page bottom are clipped by the viewer.
    for (i, record) in records.iter().enumerate() {
        let y = ANNOTATION_FIRST_LINE_Y + ANNOTATION_LINE_HEIGHT * i as f64;
        builder.add_text(page, &annotation_line(i, record, namer), ANNOTATION_LEFT, y, style);
    }
}

fn write_inline(builder: &mut PdfBuilder, records: &[AnnotationRecord], image: &RasterImage, dark_mode: bool) {
    let scale_x = IMAGE_WIDTH / image.width().max(1) as f64;
    let scale_y = INLINE_PAGE_HEIGHT / image.height().max(1) as f64;
    let style = TextStyle {
        font: Font::TimesItalic,
        size: 10.0,
        color: if dark_mode { [1.0, 1.0, 1.0] } else { [0.0, 0.0, 0.0] },
    };

    for record in records {
        let (x, y) = record.inline_position(scale_x, scale_y);
        let text = record.description.unwrap_or(INLINE_PLACEHOLDER);
        builder.add_text(0, text, x, y, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use drawport_core::BoxFuture;
    use drawport_render::RenderResult;
    use lopdf::{Document, Object};

    /// Returns a fixed-size white image regardless of input.
    struct FixedRasterizer;

    impl Rasterizer for FixedRasterizer {
        fn rasterize<'a>(&'a self, _request: RasterRequest<'a>) -> BoxFuture<'a, RenderResult<RasterImage>> {
            Box::pin(async { RasterImage::new(4, 2, [255; 4].repeat(8)) })
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize<'a>(&'a self, _request: RasterRequest<'a>) -> BoxFuture<'a, RenderResult<RasterImage>> {
            Box::pin(async { Err(RenderError::CanvasTooBig { width: 20_000, height: 10 }) })
        }
    }

    fn page_text(doc: &Document, page: u32) -> Vec<String> {
        let page_id = doc.get_pages()[&page];
        doc.get_and_decode_page_content(page_id)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    fn annotated_config() -> ExportConfig {
        ExportConfig::default().with_annotations(true)
    }

    fn export(elements: &[DrawingElement], config: &ExportConfig) -> (ExportReport, Document) {
        let exporter = PdfExporter::new(FixedRasterizer, MemorySink::new());
        let report =
            pollster::block_on(exporter.try_export_to_pdf(elements, config, &BinaryFiles::new()))
                .unwrap();
        let bytes = exporter.sink().get(&report.file_name).unwrap();
        (report, Document::load_mem(&bytes).unwrap())
    }

    #[test]
    fn test_rectangle_with_annotations() {
        let elements =
            [DrawingElement::new("rectangle", 0.0, 0.0).with_size(100.0, 50.0).with_colors("#ff0000", "#000000")];
        let (report, doc) = export(&elements, &annotated_config());

        assert_eq!(report.page_count, 2);
        assert_eq!(report.annotation_count, 1);
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(
            page_text(&doc, 2),
            vec![
                "Annotations".to_string(),
                "1. It has a rectangle with the background color of Red and border color of Black"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_scene_with_annotations() {
        let (report, doc) = export(&[], &annotated_config());
        assert_eq!(report.page_count, 2);
        assert_eq!(page_text(&doc, 2), vec!["Annotations".to_string()]);
    }

    #[test]
    fn test_annotations_off_is_single_page() {
        let elements = [DrawingElement::new("ellipse", 5.0, 5.0).with_size(40.0, 40.0)];
        let (report, doc) = export(&elements, &ExportConfig::default());
        assert_eq!(report.file_name, "export.pdf");
        assert_eq!(report.page_count, 1);
        assert_eq!(doc.get_pages().len(), 1);
        assert!(page_text(&doc, 1).is_empty());
    }

    #[test]
    fn test_failing_rasterizer_saves_nothing() {
        let exporter = PdfExporter::new(FailingRasterizer, MemorySink::new());
        let result = pollster::block_on(exporter.try_export_to_pdf(
            &[],
            &annotated_config(),
            &BinaryFiles::new(),
        ));
        assert!(matches!(result, Err(ExportError::Render(_))));
        assert!(exporter.sink().is_empty());

        pollster::block_on(exporter.export_to_pdf(&[], &annotated_config(), &BinaryFiles::new()));
        assert!(exporter.sink().is_empty());
    }

    #[test]
    fn test_unknown_kind_and_transparent_background() {
        let namer = PaletteNamer::new();
        let records = derive_annotations(&[DrawingElement::new("text", 0.0, 0.0)]);
        assert_eq!(
            annotation_line(0, &records[0], &namer),
            "1. Not Sure with the background color of Unknown Color and border color of Black"
        );
    }

    #[test]
    fn test_project_name_sets_file_name() {
        let mut config = annotated_config();
        config.set_project_name("Sprint board");
        let (report, _) = export(&[], &config);
        assert_eq!(report.file_name, "Sprint board.pdf");
    }

    #[test]
    fn test_inline_layout_stays_on_first_page() {
        let config = annotated_config().with_annotation_layout(AnnotationLayout::Inline);
        let elements = [
            DrawingElement::new("diamond", 0.0, 0.0).with_size(10.0, 10.0),
            DrawingElement::new("text", 1.0, 1.0),
        ];
        let (report, doc) = export(&elements, &config);
        assert_eq!(report.page_count, 1);
        assert_eq!(
            page_text(&doc, 1),
            vec!["It has a diamond".to_string(), "No text provided".to_string()]
        );
    }

    #[test]
    fn test_embed_scene_attaches_file() {
        let config = ExportConfig::default().with_embed_scene(true);
        let (_, doc) = export(&[DrawingElement::new("line", 0.0, 0.0)], &config);
        let catalog = doc.catalog().unwrap();
        let names = catalog.get(b"Names").unwrap().as_dict().unwrap();
        let embedded = names.get(b"EmbeddedFiles").unwrap().as_dict().unwrap();
        let entries = embedded.get(b"Names").unwrap().as_array().unwrap();
        assert_eq!(entries[0].as_str().unwrap(), b"export.excalidraw");
    }

    struct ShoutingNamer;

    impl ColorNamer for ShoutingNamer {
        fn name_of(&self, color: &str) -> Option<String> {
            Some(color.to_uppercase())
        }
    }

    #[test]
    fn test_custom_namer() {
        let exporter =
            PdfExporter::new(FixedRasterizer, MemorySink::new()).with_namer(ShoutingNamer);
        let elements = [DrawingElement::new("arrow", 0.0, 0.0).with_colors("#abcdef", "#123456")];
        let report = pollster::block_on(exporter.try_export_to_pdf(
            &elements,
            &annotated_config(),
            &BinaryFiles::new(),
        ))
        .unwrap();
        let doc = Document::load_mem(&exporter.sink().get(&report.file_name).unwrap()).unwrap();
        assert_eq!(
            page_text(&doc, 2)[1],
            "1. It has an arrow with the background color of #ABCDEF and border color of #123456"
        );
    }
}
