//! Conversion settings

use serde::Deserialize;
use slidepdf_render::{ConvertOptions, LayoutMode};
use std::path::Path;

/// How uploaded decks are drawn
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    /// `shapes` or `text`
    #[serde(default)]
    pub mode: LayoutMode,
}

impl RenderConfig {
    /// Converter options writing scratch files into `temp_dir`.
    pub fn convert_options(&self, temp_dir: &Path) -> ConvertOptions {
        ConvertOptions::new()
            .with_mode(self.mode)
            .with_scratch_dir(temp_dir)
    }
}
