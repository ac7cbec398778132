//! Domain types for representing a parsed slide deck.

use serde::{Deserialize, Serialize};

/// English Metric Units per inch, the native length unit of OOXML decks.
pub const EMU_PER_INCH: i64 = 914_400;

/// Default slide width (10in) used when a deck does not declare one.
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;

/// Default slide height (7.5in) used when a deck does not declare one.
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

/// Represents an entire deck with its extracted shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Original filename (without path).
    pub filename: String,

    /// Slide dimensions shared by every slide, in native units.
    pub size: SlideSize,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create a new empty deck with the given filename and slide size.
    pub fn new(filename: impl Into<String>, size: SlideSize) -> Self {
        Self {
            filename: filename.into(),
            size,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }
}

/// Deck-wide slide dimensions in the deck's native length unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
}

impl SlideSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDE_WIDTH as f64, DEFAULT_SLIDE_HEIGHT as f64)
    }
}

/// The format of the source deck file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Recognized so it can be rejected clearly.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from the extension of a file name such as `deck.pptx`.
    ///
    /// Case-insensitive. A name that is only an extension (`.pptx`) counts.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }

    /// Whether this format can be converted.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Pptx)
    }
}

/// A single slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Shapes in source (z) order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}

/// Position and size of a shape in native units, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Content of a slide, in the subset this converter understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// Text body; paragraphs and soft breaks are separated by `\n`.
    Text {
        text: String,
        frame: Option<Frame>,
    },

    /// Embedded picture with the raw bytes of its media part.
    Image {
        name: Option<String>,
        #[serde(skip)]
        data: Vec<u8>,
        frame: Option<Frame>,
    },

    /// Anything else (tables, charts, connectors, empty shapes).
    Other,
}

impl Shape {
    /// Create a text shape.
    pub fn text(text: impl Into<String>, frame: Option<Frame>) -> Self {
        Self::Text {
            text: text.into(),
            frame,
        }
    }

    /// Create an image shape.
    pub fn image(data: Vec<u8>, frame: Option<Frame>) -> Self {
        Self::Image {
            name: None,
            data,
            frame,
        }
    }
}
