//! Core domain types, coordinate mapping, and errors for converting
//! slide decks into page-per-slide PDF documents.

pub mod error;
pub mod geometry;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use geometry::{CoordinateMapper, Placement, Rect};
pub use source::SlideSource;
pub use types::{Deck, Frame, PresentationFormat, Shape, Slide, SlideSize};
