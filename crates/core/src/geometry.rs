//! Mapping from deck coordinates to PDF page coordinates.
//!
//! Decks place shapes from a top-left origin in their native unit. PDF pages
//! use points from a bottom-left origin, so every rectangle is scaled and its
//! y axis flipped: `doc_y = page_height - (top + height) * scale`.

use crate::types::{Frame, SlideSize, EMU_PER_INCH};

/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Scale from EMU to points (1pt = 12700 EMU).
pub const POINTS_PER_EMU: f64 = POINTS_PER_INCH / EMU_PER_INCH as f64;

/// Left offset of shapes that carry no position, in points.
pub const FALLBACK_LEFT: f64 = 50.0;

/// Top offset of the first shape that carries no position, in points.
pub const FALLBACK_TOP: f64 = 50.0;

/// Vertical step between successive shapes without a position, in points.
pub const FALLBACK_STEP: f64 = 30.0;

/// Rectangle in document space (points, bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Y coordinate of the top edge.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Same top-left corner with a different size, keeping the top edge fixed.
    pub fn with_size(&self, width: f64, height: f64) -> Self {
        Self::new(self.x, self.top() - height, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Converts native deck coordinates into page coordinates for one deck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    slide: SlideSize,
    scale: f64,
}

impl CoordinateMapper {
    /// Create a mapper for a deck of the given size and a fixed scale
    /// (document units per native unit).
    pub fn new(slide: SlideSize, scale: f64) -> Self {
        Self { slide, scale }
    }

    /// Mapper for decks measured in EMU, producing points.
    pub fn for_emu(slide: SlideSize) -> Self {
        Self::new(slide, POINTS_PER_EMU)
    }

    pub fn page_width(&self) -> f64 {
        self.slide.width * self.scale
    }

    pub fn page_height(&self) -> f64 {
        self.slide.height * self.scale
    }

    /// Page size as (width, height).
    pub fn page_size(&self) -> (f64, f64) {
        (self.page_width(), self.page_height())
    }

    /// Map a native frame into a page rectangle with the y axis flipped.
    ///
    /// Negative offsets and sizes are clamped to zero.
    pub fn map_frame(&self, frame: &Frame) -> Rect {
        let left = frame.x.max(0.0);
        let top = frame.y.max(0.0);
        let width = frame.width.max(0.0);
        let height = frame.height.max(0.0);

        Rect::new(
            left * self.scale,
            self.page_height() - (top + height) * self.scale,
            width * self.scale,
            height * self.scale,
        )
    }

    /// Zero-sized rectangle for the `index`-th shape on a slide that has no
    /// position, stacked down from the top-left of the page.
    pub fn fallback_rect(&self, index: usize) -> Rect {
        let top = FALLBACK_TOP + index as f64 * FALLBACK_STEP;
        Rect::new(FALLBACK_LEFT, self.page_height() - top, 0.0, 0.0)
    }
}

/// Hands out fallback positions for frameless shapes on one slide.
#[derive(Debug)]
pub struct Placement<'a> {
    mapper: &'a CoordinateMapper,
    unplaced: usize,
}

impl<'a> Placement<'a> {
    pub fn new(mapper: &'a CoordinateMapper) -> Self {
        Self {
            mapper,
            unplaced: 0,
        }
    }

    /// Page rectangle for a shape, falling back to the next stacked slot
    /// when the shape has no frame.
    pub fn place(&mut self, frame: Option<&Frame>) -> Rect {
        match frame {
            Some(frame) => self.mapper.map_frame(frame),
            None => {
                let rect = self.mapper.fallback_rect(self.unplaced);
                self.unplaced += 1;
                rect
            }
        }
    }
}
