//! Deck-to-PDF conversion.

use crate::pdf::PdfBuilder;
use crate::translate::{LayoutMode, SlideTranslator};
use serde::Serialize;
use slidepdf_core::{CoordinateMapper, Error, PresentationFormat, Result, SlideSource};
use slidepdf_pptx::PptxParser;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Conversion settings.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub mode: LayoutMode,
    /// Directory for the in-progress output. Defaults to the directory of
    /// the destination file.
    pub scratch_dir: Option<PathBuf>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Pages written; always the number of slides in the deck.
    pub pages: usize,
    /// 1-based numbers of slides replaced by an error page.
    pub failed_slides: Vec<usize>,
    /// Images that could not be decoded and were drawn as placeholders.
    pub placeholder_images: usize,
}

/// Converts decks into page-per-slide PDF documents.
///
/// A converter holds no per-conversion state and can be shared across
/// threads; each call builds its own document.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert the presentation at `src` into a PDF at `dest`.
    ///
    /// `dest` is either a complete document or left untouched.
    pub fn convert_file(&self, src: &Path, dest: &Path) -> Result<ConversionReport> {
        let file = File::open(src)?;
        let mut reader = BufReader::new(file);

        let mut magic = Vec::with_capacity(8);
        (&mut reader).take(8).read_to_end(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;

        let filename = src
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        let format = PresentationFormat::from_magic(&magic)
            .or_else(|| PresentationFormat::from_filename(filename))
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("could not detect the format of {}", src.display()))
            })?;

        if !format.is_supported() {
            return Err(Error::UnsupportedFormat(
                "legacy .ppt files are not supported; save the deck as .pptx".to_string(),
            ));
        }

        log::info!("Converting {} to {}", src.display(), dest.display());
        let mut package = PptxParser::new().open(reader, filename)?;
        self.convert_source(&mut package, dest)
    }

    /// Render every slide of `source` and write the document to `dest`.
    pub fn convert_source<S: SlideSource>(&self, source: &mut S, dest: &Path) -> Result<ConversionReport> {
        let (builder, report) = self.render(source)?;

        let scratch_dir = match &self.options.scratch_dir {
            Some(dir) => dir.clone(),
            None => dest
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        builder.save(dest, &scratch_dir)?;

        log::info!(
            "Wrote {} ({} pages, {} failed slides, {} placeholder images)",
            dest.display(),
            report.pages,
            report.failed_slides.len(),
            report.placeholder_images
        );

        Ok(report)
    }

    /// Render every slide of `source` into an in-memory PDF.
    pub fn render_to_bytes<S: SlideSource>(&self, source: &mut S) -> Result<(Vec<u8>, ConversionReport)> {
        let (builder, report) = self.render(source)?;
        Ok((builder.to_bytes()?, report))
    }

    /// Draw one page per slide. A slide that cannot be loaded becomes an
    /// error page; the remaining slides are still drawn.
    pub fn render<S: SlideSource>(&self, source: &mut S) -> Result<(PdfBuilder, ConversionReport)> {
        let size = source.slide_size();
        if size.width <= 0.0 || size.height <= 0.0 {
            return Err(Error::CorruptedFile(format!(
                "invalid slide size {} x {}",
                size.width, size.height
            )));
        }

        let translator = SlideTranslator::new(CoordinateMapper::for_emu(size), self.options.mode);
        let mut builder = PdfBuilder::new();
        let mut report = ConversionReport::default();

        for idx in 0..source.slide_count() {
            let number = idx + 1;
            let canvas = match source.load_slide(idx) {
                Ok(slide) => {
                    let (canvas, stats) = translator.translate(&builder, &slide);
                    report.placeholder_images += stats.placeholders;
                    canvas
                }
                Err(e) => {
                    log::warn!("Slide {} could not be read: {}", number, e);
                    report.failed_slides.push(number);
                    translator.error_page(&builder, number, &e.to_string())
                }
            };
            builder.finish_page(canvas)?;
        }

        report.pages = builder.page_count();
        Ok((builder, report))
    }
}
