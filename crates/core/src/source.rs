//! Slide-by-slide access to a deck.

use crate::error::{Error, Result};
use crate::types::{Deck, Slide, SlideSize};

/// Anything that can hand out slides in presentation order.
///
/// Each slide is loaded independently, so a broken slide does not prevent
/// the others from being read.
pub trait SlideSource {
    /// Slide dimensions in native units.
    fn slide_size(&self) -> SlideSize;

    /// Number of slides in the deck.
    fn slide_count(&self) -> usize;

    /// Load the slide at `index` (0-based).
    fn load_slide(&mut self, index: usize) -> Result<Slide>;
}

impl SlideSource for Deck {
    fn slide_size(&self) -> SlideSize {
        self.size
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn load_slide(&mut self, index: usize) -> Result<Slide> {
        self.slides.get(index).cloned().ok_or_else(|| {
            Error::CorruptedFile(format!(
                "slide index {} out of range ({} slides)",
                index,
                self.slides.len()
            ))
        })
    }
}
