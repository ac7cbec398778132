//! PPTX file parser implementation.

use crate::presentation::parse_presentation;
use crate::rels::{extract_slide_number, parse_relationships, rels_path_for, resolve_target, Relationship};
use crate::slide::{parse_slide_xml, Placeholder, RawKind, RawShape};
use slidepdf_core::{Deck, Error, Frame, Result, Shape, Slide, SlideSize, SlideSource};
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open a PPTX package for slide-by-slide reading.
    ///
    /// Only the presentation part and its relationships are read here; slide
    /// parts are parsed on demand by [`SlideSource::load_slide`].
    pub fn open<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<PptxPackage<R>> {
        let archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut package = PptxPackage {
            archive,
            slide_size: SlideSize::default(),
            slide_paths: Vec::new(),
        };

        let presentation_xml = package.read_part_string(PRESENTATION_PART).map_err(|e| {
            Error::PptxParseError(format!("Missing or unreadable {}: {}", PRESENTATION_PART, e))
        })?;
        let info = parse_presentation(&presentation_xml)?;
        if let Some(size) = info.slide_size {
            package.slide_size = size;
        } else {
            log::debug!("No slide size declared, using the 4:3 default");
        }

        let rels = package.relationships(PRESENTATION_PART)?;
        package.slide_paths = slide_order(&info.slide_ids, &rels);

        log::debug!(
            "Opened {} with {} slides ({} x {} EMU)",
            filename,
            package.slide_paths.len(),
            package.slide_size.width,
            package.slide_size.height
        );

        Ok(package)
    }

    /// Parse a whole PPTX file from a reader.
    ///
    /// Fails on the first slide that cannot be read.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Deck> {
        let mut package = self.open(reader, filename)?;
        let mut deck = Deck::new(filename, package.slide_size());

        for idx in 0..package.slide_count() {
            let slide = package.load_slide(idx)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// An opened PPTX package.
pub struct PptxPackage<R> {
    archive: ZipArchive<R>,
    slide_size: SlideSize,
    slide_paths: Vec<String>,
}

impl<R: Read + Seek> PptxPackage<R> {
    /// Relationships of `part`. A part without a `.rels` file has none.
    fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let rels_path = rels_path_for(part);
        if self.archive.by_name(&rels_path).is_err() {
            return Ok(Vec::new());
        }
        let xml = self.read_part_string(&rels_path)?;
        parse_relationships(&xml)
    }

    /// Resolve a raw picture's media bytes. Failures leave the data empty so
    /// the renderer can substitute a placeholder.
    fn picture_data(&mut self, slide_path: &str, shape: &RawShape, rels: &[Relationship]) -> Vec<u8> {
        let Some(embed) = shape.embed.as_deref() else {
            log::warn!("{}: picture without a blip reference", slide_path);
            return Vec::new();
        };

        let Some(rel) = rels.iter().find(|r| r.id == embed) else {
            log::warn!("{}: picture relationship {} not found", slide_path, embed);
            return Vec::new();
        };

        if rel.external {
            log::warn!("{}: linked picture {} is not embedded", slide_path, rel.target);
            return Vec::new();
        }

        let media_path = resolve_target(slide_path, &rel.target);
        match self.read_part(&media_path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("{}: {}", slide_path, e);
                Vec::new()
            }
        }
    }

    /// Placeholders of the slide's layout and of the layout's master.
    /// Unreadable parts are logged and contribute nothing.
    fn inherited_placeholders(
        &mut self,
        slide_path: &str,
        rels: &[Relationship],
    ) -> InheritedPlaceholders {
        let mut inherited = InheritedPlaceholders::default();

        let Some(layout_path) = related_part(slide_path, rels, "slideLayout") else {
            log::debug!("{}: no slide layout", slide_path);
            return inherited;
        };
        match self.placeholder_shapes(&layout_path) {
            Ok(shapes) => inherited.layout = shapes,
            Err(e) => {
                log::warn!("{}: unreadable layout {}: {}", slide_path, layout_path, e);
                return inherited;
            }
        }

        let layout_rels = self.relationships(&layout_path).unwrap_or_else(|e| {
            log::warn!("{}: unreadable relationships: {}", layout_path, e);
            Vec::new()
        });
        if let Some(master_path) = related_part(&layout_path, &layout_rels, "slideMaster") {
            match self.placeholder_shapes(&master_path) {
                Ok(shapes) => inherited.master = shapes,
                Err(e) => log::warn!("{}: unreadable master {}: {}", slide_path, master_path, e),
            }
        }

        inherited
    }

    fn placeholder_shapes(&mut self, part: &str) -> Result<Vec<RawShape>> {
        let content = self.read_part_string(part)?;
        let mut shapes = parse_slide_xml(&content)?;
        shapes.retain(|s| s.placeholder.is_some());
        Ok(shapes)
    }

    /// Read a file from the ZIP archive.
    fn read_part(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }

    fn read_part_string(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_part(path)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::CorruptedFile(format!("'{}' is not valid UTF-8: {}", path, e)))
    }
}

impl<R: Read + Seek> SlideSource for PptxPackage<R> {
    fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    fn slide_count(&self) -> usize {
        self.slide_paths.len()
    }

    fn load_slide(&mut self, index: usize) -> Result<Slide> {
        let slide_path = self.slide_paths.get(index).cloned().ok_or_else(|| {
            Error::CorruptedFile(format!(
                "slide index {} out of range ({} slides)",
                index,
                self.slide_paths.len()
            ))
        })?;

        let content = self.read_part_string(&slide_path)?;
        let raw_shapes = parse_slide_xml(&content)?;

        let has_pictures = raw_shapes.iter().any(|s| s.kind == RawKind::Picture);
        let needs_layout = raw_shapes
            .iter()
            .any(|s| s.offset.is_none() && s.placeholder.is_some());

        let rels = if has_pictures || needs_layout {
            self.relationships(&slide_path).unwrap_or_else(|e| {
                log::warn!("{}: unreadable relationships: {}", slide_path, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };
        let inherited = if needs_layout {
            self.inherited_placeholders(&slide_path, &rels)
        } else {
            InheritedPlaceholders::default()
        };

        let mut slide = Slide::new(index + 1);
        for raw in raw_shapes {
            let frame = raw
                .frame()
                .or_else(|| raw.placeholder.as_ref().and_then(|ph| inherited.frame_for(ph)));
            let shape = match raw.kind {
                RawKind::Text => Shape::Text {
                    text: raw.text,
                    frame,
                },
                RawKind::Picture => Shape::Image {
                    data: self.picture_data(&slide_path, &raw, &rels),
                    name: raw.name,
                    frame,
                },
                RawKind::Other => Shape::Other,
            };
            slide.add_shape(shape);
        }

        log::debug!("{}: {} shapes", slide_path, slide.shapes.len());
        Ok(slide)
    }
}

/// Placeholder shapes a slide's placeholders take their position from.
#[derive(Debug, Default)]
struct InheritedPlaceholders {
    layout: Vec<RawShape>,
    master: Vec<RawShape>,
}

impl InheritedPlaceholders {
    /// The layout placeholder with the same `idx` wins. Without a frame there,
    /// the master placeholder of the same base type is used.
    fn frame_for(&self, placeholder: &Placeholder) -> Option<Frame> {
        let on_layout = self
            .layout
            .iter()
            .find(|s| s.placeholder.as_ref().is_some_and(|p| p.idx == placeholder.idx));
        if let Some(frame) = on_layout.and_then(RawShape::frame) {
            return Some(frame);
        }

        let base = on_layout
            .and_then(|s| s.placeholder.as_ref())
            .unwrap_or(placeholder)
            .base_kind();
        self.master
            .iter()
            .filter(|s| s.placeholder.as_ref().is_some_and(|p| p.base_kind() == base))
            .find_map(RawShape::frame)
    }
}

/// Resolved part name of the first internal relationship of type `kind`.
fn related_part(part: &str, rels: &[Relationship], kind: &str) -> Option<String> {
    rels.iter()
        .find(|r| r.has_type(kind) && !r.external)
        .map(|r| resolve_target(part, &r.target))
}

/// Order slide part paths by the presentation's `sldIdLst`, falling back to
/// the numbering of the slide relationships when the list is absent.
fn slide_order(slide_ids: &[String], rels: &[Relationship]) -> Vec<String> {
    if !slide_ids.is_empty() {
        return slide_ids
            .iter()
            .filter_map(|id| match rels.iter().find(|r| &r.id == id) {
                Some(rel) => Some(resolve_target(PRESENTATION_PART, &rel.target)),
                None => {
                    log::warn!("Slide relationship {} not found, skipping", id);
                    None
                }
            })
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .filter(|r| r.is_slide() && !r.external)
        .map(|r| {
            let order_num = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
            (resolve_target(PRESENTATION_PART, &r.target), order_num)
        })
        .collect();

    // Sort slides by their number
    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    slides.into_iter().map(|(path, _)| path).collect()
}
