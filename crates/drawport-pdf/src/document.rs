//! Minimal PDF document builder on top of lopdf.
//!
//! Coordinates are millimetres from the top-left corner of an A4 portrait
//! page, converted to PDF points (bottom-left origin) when content is
//! emitted.

use drawport_render::RasterImage;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::io::Write;

/// A4 page width in millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;

/// A4 page height in millimetres.
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Built-in fonts available on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    TimesItalic,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::TimesItalic => "F2",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::TimesItalic => "Times-Italic",
        }
    }
}

/// Text drawing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    /// Font size in points.
    pub size: f32,
    /// RGB fill color, 0.0-1.0 per channel.
    pub color: [f32; 3],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: Font::Helvetica,
            size: 16.0,
            color: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Default)]
struct PageDraft {
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// Incrementally built PDF document.
pub struct PdfBuilder {
    doc: Document,
    pages: Vec<PageDraft>,
    fonts: Dictionary,
    attachments: Vec<Object>,
    title: Option<String>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    /// Create a document with one blank page.
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let mut fonts = Dictionary::new();
        for font in [Font::Helvetica, Font::TimesItalic] {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), id);
        }

        Self {
            doc,
            pages: vec![PageDraft::default()],
            fonts,
            attachments: Vec::new(),
            title: None,
        }
    }

    /// Set the document title written to the info dictionary.
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Append a blank page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageDraft::default());
        self.pages.len() - 1
    }

    /// Number of pages so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Place an image with its top-left corner at (`x`, `y`).
    ///
    /// A `height` of 0 keeps the image's aspect ratio. Returns the height
    /// actually used, in millimetres.
    pub fn add_image(&mut self, page: usize, image: &RasterImage, x: f64, y: f64, width: f64, height: f64) -> std::io::Result<f64> {
        let height = if height > 0.0 {
            height
        } else {
            width * image.aspect_ratio()
        };

        let (rgb, alpha) = image.split_alpha();
        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "FlateDecode",
        };
        if !image.is_opaque() {
            let smask_id = self.doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width() as i64,
                    "Height" => image.height() as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8i64,
                    "Filter" => "FlateDecode",
                },
                deflate(&alpha)?,
            ));
            image_dict.set("SMask", smask_id);
        }
        let image_id = self.doc.add_object(Stream::new(image_dict, deflate(&rgb)?));

        let draft = self.page_mut(page);
        let name = format!("Im{}", draft.xobjects.len() + 1);
        draft.xobjects.set(name.as_str(), image_id);

        let (left, bottom) = to_pdf_point(x, y + height);
        draft.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    ((width * PT_PER_MM) as f32).into(),
                    0i64.into(),
                    0i64.into(),
                    ((height * PT_PER_MM) as f32).into(),
                    left.into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(height)
    }

    /// Write a line of text with its baseline starting at (`x`, `y`).
    pub fn add_text(&mut self, page: usize, text: &str, x: f64, y: f64, style: TextStyle) {
        let (px, py) = to_pdf_point(x, y);
        let [r, g, b] = style.color;
        self.page_mut(page).operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![style.font.resource_name().into(), style.size.into()],
            ),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![px.into(), py.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Attach a file to the document's embedded files.
    pub fn attach_file(&mut self, name: &str, bytes: Vec<u8>) -> std::io::Result<()> {
        let stream_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "EmbeddedFile",
                "Filter" => "FlateDecode",
                "Params" => dictionary! { "Size" => bytes.len() as i64 },
            },
            deflate(&bytes)?,
        ));
        let filespec_id = self.doc.add_object(dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(name),
            "UF" => Object::string_literal(name),
            "EF" => dictionary! { "F" => stream_id },
        });
        self.attachments.push(Object::string_literal(name));
        self.attachments.push(filespec_id.into());
        Ok(())
    }

    /// Assemble the page tree and serialize the document.
    pub fn finish(mut self) -> lopdf::Result<Vec<u8>> {
        let pages_id = self.doc.new_object_id();
        let media_box: Vec<Object> = vec![
            0i64.into(),
            0i64.into(),
            ((PAGE_WIDTH_MM * PT_PER_MM) as f32).into(),
            ((PAGE_HEIGHT_MM * PT_PER_MM) as f32).into(),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for draft in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: draft.operations,
            };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => self.fonts.clone(),
                    "XObject" => draft.xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.attachments.is_empty() {
            catalog.set(
                "Names",
                dictionary! {
                    "EmbeddedFiles" => dictionary! { "Names" => std::mem::take(&mut self.attachments) },
                },
            );
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! { "Producer" => Object::string_literal("drawport") };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn page_mut(&mut self, page: usize) -> &mut PageDraft {
        let last = self.pages.len() - 1;
        &mut self.pages[page.min(last)]
    }
}

/// Convert top-left millimetres to bottom-left points.
fn to_pdf_point(x: f64, y: f64) -> (f32, f32) {
    (
        (x * PT_PER_MM) as f32,
        ((PAGE_HEIGHT_MM - y) * PT_PER_MM) as f32,
    )
}

/// Characters WinAnsiEncoding places in 0x80-0x9F, indexed from 0x80.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20ac}'), None, Some('\u{201a}'), Some('\u{0192}'),
    Some('\u{201e}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02c6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017d}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201c}'),
    Some('\u{201d}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02dc}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203a}'),
    Some('\u{0153}'), None, Some('\u{017e}'), Some('\u{0178}'),
];

/// Encode text for a WinAnsi built-in font; unencodable characters become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        // C1 controls share their byte values with the WinAnsi extras.
        0x80..=0x9f => b'?',
        code @ 0..=0xff => code as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|&mapped| mapped == Some(c))
            .map_or(b'?', |i| 0x80 + i as u8),
    }
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tj_strings(doc: &Document, page: u32) -> Vec<String> {
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

    #[test]
    fn test_new_document_has_one_page() {
        let bytes = PdfBuilder::new().finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_text_on_second_page() {
        let mut builder = PdfBuilder::new();
        let page = builder.add_page();
        builder.add_text(page, "Hello (world)", 10.0, 20.0, TextStyle::default());
        assert_eq!(builder.page_count(), 2);

        let doc = Document::load_mem(&builder.finish().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert!(tj_strings(&doc, 1).is_empty());
        assert_eq!(tj_strings(&doc, 2), vec!["Hello (world)".to_string()]);
    }

    #[test]
    fn test_image_auto_height_keeps_aspect_ratio() {
        let image = RasterImage::new(4, 2, [255, 0, 0, 255].repeat(8)).unwrap();
        let mut builder = PdfBuilder::new();
        let height = builder.add_image(0, &image, 10.0, 10.0, 190.0, 0.0).unwrap();
        assert!((height - 95.0).abs() < f64::EPSILON);

        let doc = Document::load_mem(&builder.finish().unwrap()).unwrap();
        let page_id = doc.get_pages()[&1];
        let ops = doc.get_and_decode_page_content(page_id).unwrap().operations;
        assert!(ops.iter().any(|op| op.operator == "Do"));
    }

    #[test]
    fn test_transparent_image_gets_soft_mask() {
        let image = RasterImage::new(1, 1, vec![0, 0, 0, 0]).unwrap();
        let mut builder = PdfBuilder::new();
        builder.add_image(0, &image, 0.0, 0.0, 10.0, 10.0).unwrap();
        let doc = Document::load_mem(&builder.finish().unwrap()).unwrap();
        let has_smask = doc.objects.values().any(|obj| match obj {
            Object::Stream(stream) => stream.dict.has(b"SMask"),
            _ => false,
        });
        assert!(has_smask);
    }

    #[test]
    fn test_non_latin_text_is_replaced() {
        assert_eq!(encode_text("a\u{e9}\u{4e2d}"), vec![b'a', 0xe9, b'?']);
    }

    #[test]
    fn test_win_ansi_punctuation() {
        assert_eq!(
            encode_text("\u{20ac}\u{201c}\u{2014}\u{201d}\u{2122}"),
            vec![0x80, 0x93, 0x97, 0x94, 0x99]
        );
    }

    #[test]
    fn test_c1_controls_are_replaced() {
        assert_eq!(encode_text("\u{80}\u{93}\u{9f}"), vec![b'?', b'?', b'?']);
    }

    #[test]
    fn test_point_conversion() {
        let (x, y) = to_pdf_point(0.0, PAGE_HEIGHT_MM);
        assert!(x.abs() < f32::EPSILON);
        assert!(y.abs() < 1e-3);
    }
}
