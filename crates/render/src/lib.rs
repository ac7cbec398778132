//! Page-per-slide PDF rendering.
//!
//! A [`Converter`] pulls slides from a [`slidepdf_core::SlideSource`],
//! draws each one with a [`SlideTranslator`], and writes the resulting
//! document atomically.

pub mod convert;
pub mod images;
pub mod pdf;
pub mod translate;

pub use convert::{ConversionReport, ConvertOptions, Converter};
pub use images::{decode_image, DecodedImage};
pub use pdf::{Color, PageCanvas, PdfBuilder};
pub use translate::{LayoutMode, PageStats, SlideTranslator};
