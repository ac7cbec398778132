//! Minimal PDF document builder on top of `lopdf`.
//!
//! Pages are drawn on a [`PageCanvas`] and sealed by handing the canvas back
//! to [`PdfBuilder::finish_page`], which takes it by value. Nothing touches
//! the filesystem until [`PdfBuilder::save`].

use crate::images::DecodedImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use slidepdf_core::{Error, Rect, Result};
use std::io::Write;
use std::path::Path;

/// Resource name of the page font (standard Helvetica).
const FONT_NAME: &str = "F1";

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    fn operands(&self) -> Vec<Object> {
        vec![real(self.r), real(self.g), real(self.b)]
    }
}

/// Accumulates sealed pages and serializes them into one PDF.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
        }
    }

    /// Open a new page of the given size in points.
    pub fn begin_page(&self, width: f64, height: f64) -> PageCanvas {
        PageCanvas {
            width,
            height,
            operations: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Seal `canvas` and append it as the next page.
    pub fn finish_page(&mut self, canvas: PageCanvas) -> Result<()> {
        let PageCanvas {
            width,
            height,
            operations,
            images,
        } = canvas;

        let mut xobjects = Dictionary::new();
        for (idx, image) in images.into_iter().enumerate() {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            };
            let image_id = self.doc.add_object(Stream::new(dict, image.rgb));
            xobjects.set(image_name(idx), image_id);
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| Error::RenderError(format!("Failed to encode page content: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => self.font_id },
            "XObject" => xobjects,
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(width), real(height)],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);

        Ok(())
    }

    /// Number of sealed pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Finalize the page tree and serialize the document.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| Error::RenderError(format!("Failed to serialize PDF: {}", e)))?;

        Ok(bytes)
    }

    /// Serialize and write the document to `dest`.
    ///
    /// The bytes go to a scratch file in `scratch_dir` first and are renamed
    /// onto `dest`, so `dest` never holds a partial document.
    pub fn save(self, dest: &Path, scratch_dir: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;

        let mut scratch = tempfile::NamedTempFile::new_in(scratch_dir)?;
        scratch.write_all(&bytes)?;
        scratch.as_file().sync_all()?;
        scratch.persist(dest).map_err(|e| Error::IoError(e.error))?;

        Ok(())
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drawing surface for a single open page. Coordinates are points from the
/// bottom-left corner.
#[derive(Debug)]
pub struct PageCanvas {
    width: f64,
    height: f64,
    operations: Vec<Operation>,
    images: Vec<DecodedImage>,
}

impl PageCanvas {
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whole-page rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", color.operands()),
            Operation::new("re", rect_operands(&rect)),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", color.operands()),
            Operation::new("w", vec![real(line_width)]),
            Operation::new("re", rect_operands(&rect)),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Draw one line of Helvetica with its baseline starting at (x, y).
    pub fn draw_text(&mut self, x: f64, y: f64, size: f64, color: Color, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", color.operands()),
            Operation::new("Tf", vec![Object::Name(FONT_NAME.as_bytes().to_vec()), real(size)]),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Paint `image` stretched over `rect`.
    pub fn draw_image(&mut self, rect: Rect, image: DecodedImage) {
        let name = image_name(self.images.len());
        self.images.push(image);
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width),
                    real(0.0),
                    real(0.0),
                    real(rect.height),
                    real(rect.x),
                    real(rect.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Strings drawn so far, in drawing order.
    pub fn text_runs(&self) -> Vec<String> {
        self.operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => {
                    Some(bytes.iter().map(|&b| char::from(b)).collect())
                }
                _ => None,
            })
            .collect()
    }
}

fn image_name(idx: usize) -> String {
    format!("Im{}", idx + 1)
}

fn rect_operands(rect: &Rect) -> Vec<Object> {
    vec![real(rect.x), real(rect.y), real(rect.width), real(rect.height)]
}

fn real(value: f64) -> Object {
    Object::Real((value as f32).into())
}

/// Encode text for a WinAnsi-encoded standard font. Characters with no
/// WinAnsi code point become `?`; control characters are dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(b' '),
            c if c.is_control() => None,
            c if (c as u32) < 0x80 => Some(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => Some(c as u32 as u8),
            '€' => Some(0x80),
            '‚' => Some(0x82),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '™' => Some(0x99),
            _ => Some(b'?'),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(bytes: &[u8]) -> Document {
        Document::load_mem(bytes).expect("valid pdf")
    }

    fn number(obj: &Object) -> f64 {
        match obj {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => f64::from(*r),
            other => panic!("not a number: {:?}", other),
        }
    }

    #[test]
    fn test_pages_and_media_box() {
        let mut builder = PdfBuilder::new();
        for _ in 0..3 {
            let mut canvas = builder.begin_page(720.0, 405.0);
            let bounds = canvas.bounds();
            canvas.fill_rect(bounds, Color::WHITE);
            canvas.draw_text(10.0, 10.0, 12.0, Color::BLACK, "Hello (world)");
            builder.finish_page(canvas).unwrap();
        }
        assert_eq!(builder.page_count(), 3);

        let doc = load(&builder.to_bytes().unwrap());
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        for page_id in pages.values() {
            let page = doc.get_object(*page_id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            assert!((number(&media_box[2]) - 720.0).abs() < 1e-3);
            assert!((number(&media_box[3]) - 405.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = load(&PdfBuilder::new().to_bytes().unwrap());
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_image_xobject_is_registered() {
        let mut builder = PdfBuilder::new();
        let mut canvas = builder.begin_page(100.0, 100.0);
        canvas.draw_image(
            Rect::new(10.0, 10.0, 50.0, 50.0),
            DecodedImage {
                width: 2,
                height: 1,
                rgb: vec![255, 0, 0, 0, 255, 0],
            },
        );
        assert_eq!(canvas.image_count(), 1);
        builder.finish_page(canvas).unwrap();

        let doc = load(&builder.to_bytes().unwrap());
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.get(b"Im1").is_ok());
    }

    #[test]
    fn test_save_writes_destination_only() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");

        let mut builder = PdfBuilder::new();
        let canvas = builder.begin_page(10.0, 10.0);
        builder.finish_page(canvas).unwrap();
        builder.save(&dest, dir.path()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(std::fs::read(&dest).unwrap().starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Caf\u{e9} \u{2013} ok"), b"Caf\xe9 \x96 ok".to_vec());
        assert_eq!(encode_win_ansi("\u{4e2d}\tx\u{7}"), b"? x".to_vec());
    }

    #[test]
    fn test_text_runs() {
        let builder = PdfBuilder::new();
        let mut canvas = builder.begin_page(10.0, 10.0);
        canvas.draw_text(0.0, 0.0, 12.0, Color::BLACK, "one");
        canvas.fill_rect(canvas.bounds(), Color::grey(0.5));
        canvas.draw_text(0.0, 0.0, 12.0, Color::BLACK, "two");
        assert_eq!(canvas.text_runs(), vec!["one", "two"]);
    }
}
