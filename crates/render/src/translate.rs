//! Slide-to-page translation.
//!
//! Each slide becomes one page: a white background and border, then every
//! shape in source order, then a slide label in the bottom-right corner.
//! Shapes are drawn independently; an image that cannot be decoded is
//! replaced by a placeholder and the rest of the page is unaffected.

use crate::images::decode_image;
use crate::pdf::{Color, PageCanvas, PdfBuilder};
use serde::{Deserialize, Serialize};
use slidepdf_core::{CoordinateMapper, Placement, Rect, Shape, Slide};
use std::fmt;
use std::str::FromStr;

const TEXT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 14.0;
const TEXT_INSET: f64 = 4.0;

const LABEL_SIZE: f64 = 10.0;
const LABEL_RIGHT_OFFSET: f64 = 60.0;
const LABEL_BOTTOM: f64 = 20.0;

const ERROR_SIZE: f64 = 14.0;
const ERROR_LEFT: f64 = 72.0;
const ERROR_MAX_CHARS: usize = 160;

const BORDER_WIDTH: f64 = 1.0;
const PLACEHOLDER_SIZE: (f64, f64) = (120.0, 90.0);
const PLACEHOLDER_LABEL: &str = "Image unavailable";

const BORDER_COLOR: Color = Color::grey(0.75);
const LABEL_COLOR: Color = Color::grey(0.5);
const PLACEHOLDER_FILL: Color = Color::grey(0.88);
const PLACEHOLDER_EDGE: Color = Color::grey(0.6);
const PLACEHOLDER_TEXT: Color = Color::grey(0.35);
const ERROR_COLOR: Color = Color::rgb(0.8, 0.1, 0.1);

/// How slide content is laid out on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Border, pictures, and text at their mapped positions.
    #[default]
    Shapes,
    /// Text only, on a blank page.
    Text,
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shapes" => Ok(Self::Shapes),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown layout mode '{}' (expected shapes or text)", other)),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shapes => write!(f, "shapes"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// What happened while drawing one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    pub images: usize,
    pub placeholders: usize,
    pub text_lines: usize,
}

/// Draws slides onto pages of one deck's size.
#[derive(Debug, Clone)]
pub struct SlideTranslator {
    mapper: CoordinateMapper,
    mode: LayoutMode,
}

impl SlideTranslator {
    pub fn new(mapper: CoordinateMapper, mode: LayoutMode) -> Self {
        Self { mapper, mode }
    }

    /// Draw `slide` onto a fresh page. The caller seals the returned canvas.
    pub fn translate(&self, builder: &PdfBuilder, slide: &Slide) -> (PageCanvas, PageStats) {
        let (width, height) = self.mapper.page_size();
        let mut canvas = builder.begin_page(width, height);
        let mut stats = PageStats::default();
        let mut placement = Placement::new(&self.mapper);

        let bounds = canvas.bounds();
        canvas.fill_rect(bounds, Color::WHITE);
        if self.mode == LayoutMode::Shapes {
            let border = Rect::new(
                BORDER_WIDTH / 2.0,
                BORDER_WIDTH / 2.0,
                width - BORDER_WIDTH,
                height - BORDER_WIDTH,
            );
            canvas.stroke_rect(border, BORDER_COLOR, BORDER_WIDTH);
        }

        for shape in &slide.shapes {
            match shape {
                Shape::Text { text, frame } => {
                    let rect = placement.place(frame.as_ref());
                    stats.text_lines += draw_text_block(&mut canvas, rect, text);
                }
                Shape::Image { name, data, frame } if self.mode == LayoutMode::Shapes => {
                    let rect = placement.place(frame.as_ref());
                    match decode_image(data) {
                        Ok(image) => {
                            let (natural_w, natural_h) = image.natural_size();
                            let target = if rect.is_empty() {
                                rect.with_size(natural_w, natural_h)
                            } else {
                                rect
                            };
                            canvas.draw_image(target, image);
                            stats.images += 1;
                        }
                        Err(e) => {
                            log::warn!(
                                "Slide {}: image {} replaced by placeholder: {}",
                                slide.number,
                                name.as_deref().unwrap_or("(unnamed)"),
                                e
                            );
                            draw_placeholder(&mut canvas, rect);
                            stats.placeholders += 1;
                        }
                    }
                }
                Shape::Image { .. } | Shape::Other => {}
            }
        }

        self.draw_label(&mut canvas, slide.number);
        (canvas, stats)
    }

    /// Full-page error notice standing in for a slide that could not be read.
    pub fn error_page(&self, builder: &PdfBuilder, slide_number: usize, message: &str) -> PageCanvas {
        let (width, height) = self.mapper.page_size();
        let mut canvas = builder.begin_page(width, height);

        let bounds = canvas.bounds();
        canvas.fill_rect(bounds, Color::WHITE);
        canvas.draw_text(
            ERROR_LEFT,
            height / 2.0,
            ERROR_SIZE,
            ERROR_COLOR,
            &format!(
                "Error rendering slide {}: {}",
                slide_number,
                truncate(message, ERROR_MAX_CHARS)
            ),
        );

        canvas
    }

    fn draw_label(&self, canvas: &mut PageCanvas, slide_number: usize) {
        let x = canvas.width() - LABEL_RIGHT_OFFSET;
        canvas.draw_text(
            x,
            LABEL_BOTTOM,
            LABEL_SIZE,
            LABEL_COLOR,
            &format!("Slide {}", slide_number),
        );
    }
}

/// Draw each line of `text` below the top edge of `rect`. Returns the number
/// of lines drawn.
fn draw_text_block(canvas: &mut PageCanvas, rect: Rect, text: &str) -> usize {
    let mut drawn = 0;
    let top = rect.top();
    let x = rect.x + TEXT_INSET;

    for (idx, line) in text.split(['\n', '\r', '\u{b}']).enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let baseline = top - LINE_HEIGHT * (idx as f64 + 1.0);
        canvas.draw_text(x, baseline, TEXT_SIZE, Color::BLACK, line);
        drawn += 1;
    }

    drawn
}

fn draw_placeholder(canvas: &mut PageCanvas, rect: Rect) {
    let rect = if rect.is_empty() {
        rect.with_size(PLACEHOLDER_SIZE.0, PLACEHOLDER_SIZE.1)
    } else {
        rect
    };

    canvas.fill_rect(rect, PLACEHOLDER_FILL);
    canvas.stroke_rect(rect, PLACEHOLDER_EDGE, 0.5);
    canvas.draw_text(
        rect.x + TEXT_INSET,
        rect.y + rect.height / 2.0 - LABEL_SIZE / 2.0,
        LABEL_SIZE,
        PLACEHOLDER_TEXT,
        PLACEHOLDER_LABEL,
    );
}

fn truncate(message: &str, max_chars: usize) -> String {
    let single_line = message.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use slidepdf_core::{Frame, SlideSize};
    use std::io::Cursor;

    fn translator(mode: LayoutMode) -> SlideTranslator {
        SlideTranslator::new(CoordinateMapper::new(SlideSize::new(400.0, 300.0), 1.0), mode)
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 128, 255])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn td_positions(canvas: &PageCanvas) -> Vec<(f32, f32)> {
        canvas
            .operations()
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| {
                let x = op.operands[0].as_float().unwrap();
                let y = op.operands[1].as_float().unwrap();
                (x, y)
            })
            .collect()
    }

    #[test]
    fn test_text_lines_and_label() {
        let mut slide = Slide::new(3);
        slide.add_shape(Shape::text(
            "Line one\nLine two",
            Some(Frame::new(0.0, 0.0, 100.0, 50.0)),
        ));

        let builder = PdfBuilder::new();
        let (canvas, stats) = translator(LayoutMode::Shapes).translate(&builder, &slide);

        assert_eq!(canvas.text_runs(), vec!["Line one", "Line two", "Slide 3"]);
        assert_eq!(stats.text_lines, 2);

        let positions = td_positions(&canvas);
        assert_eq!(positions[0], (4.0, 286.0));
        assert_eq!(positions[1], (4.0, 272.0));
        assert_eq!(positions[2], (340.0, 20.0));
    }

    #[test]
    fn test_corrupt_image_becomes_placeholder() {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::image(
            b"corrupt".to_vec(),
            Some(Frame::new(10.0, 10.0, 100.0, 80.0)),
        ));
        slide.add_shape(Shape::text("after", Some(Frame::new(0.0, 200.0, 10.0, 10.0))));

        let builder = PdfBuilder::new();
        let (canvas, stats) = translator(LayoutMode::Shapes).translate(&builder, &slide);

        assert_eq!(stats.placeholders, 1);
        assert_eq!(stats.images, 0);
        assert_eq!(canvas.image_count(), 0);
        assert_eq!(
            canvas.text_runs(),
            vec![PLACEHOLDER_LABEL, "after", "Slide 1"]
        );
    }

    #[test]
    fn test_image_is_drawn_at_mapped_rect() {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::image(png(), Some(Frame::new(0.0, 0.0, 100.0, 50.0))));

        let builder = PdfBuilder::new();
        let (canvas, stats) = translator(LayoutMode::Shapes).translate(&builder, &slide);

        assert_eq!(stats.images, 1);
        assert_eq!(canvas.image_count(), 1);
        let cm = canvas
            .operations()
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap();
        let values: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![100.0, 0.0, 0.0, 50.0, 0.0, 250.0]);
    }

    #[test]
    fn test_frameless_shapes_stack() {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::text("first", None));
        slide.add_shape(Shape::Other);
        slide.add_shape(Shape::text("second", None));

        let builder = PdfBuilder::new();
        let (canvas, _) = translator(LayoutMode::Shapes).translate(&builder, &slide);

        let positions = td_positions(&canvas);
        assert_eq!(positions[0], (54.0, 236.0));
        assert_eq!(positions[1], (54.0, 206.0));
    }

    #[test]
    fn test_text_mode_skips_images_and_border() {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::image(png(), Some(Frame::new(0.0, 0.0, 10.0, 10.0))));
        slide.add_shape(Shape::text("words", Some(Frame::new(0.0, 0.0, 10.0, 10.0))));

        let builder = PdfBuilder::new();
        let (canvas, stats) = translator(LayoutMode::Text).translate(&builder, &slide);

        assert_eq!(canvas.image_count(), 0);
        assert_eq!(stats.placeholders, 0);
        assert!(!canvas.operations().iter().any(|op| op.operator == "S"));
        assert_eq!(canvas.text_runs(), vec!["words", "Slide 1"]);
    }

    #[test]
    fn test_error_page() {
        let builder = PdfBuilder::new();
        let canvas = translator(LayoutMode::Shapes).error_page(&builder, 7, "bad\nxml");

        assert_eq!(canvas.text_runs(), vec!["Error rendering slide 7: bad xml"]);
        assert_eq!(td_positions(&canvas)[0], (72.0, 150.0));
    }

    #[test]
    fn test_layout_mode_parsing() {
        assert_eq!("Shapes".parse::<LayoutMode>(), Ok(LayoutMode::Shapes));
        assert_eq!("text".parse::<LayoutMode>(), Ok(LayoutMode::Text));
        assert!("raster".parse::<LayoutMode>().is_err());
        assert_eq!(LayoutMode::Text.to_string(), "text");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }
}
