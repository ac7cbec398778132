//! PPTX (Office Open XML) parser backend for slide-deck conversion.
//!
//! Parses .pptx files which are ZIP archives containing XML documents,
//! yielding the slide size and each slide's text and picture shapes.

pub mod parser;
pub mod presentation;
pub mod rels;
pub mod slide;
mod xml;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use parser::{PptxPackage, PptxParser};
