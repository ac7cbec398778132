//! Shape extraction from a slide part (`ppt/slides/slideN.xml`).

use crate::xml::{attr, local_name, number_attr, prefixed_attr};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidepdf_core::{Error, Frame, Result};

/// What a shape element turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawKind {
    /// `p:sp` with non-empty text.
    Text,
    /// `p:pic`.
    Picture,
    /// Connectors, graphic frames, and shapes without text.
    #[default]
    Other,
}

/// A shape as read from slide XML, before its media is resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawShape {
    pub kind: RawKind,
    /// `cNvPr@name`.
    pub name: Option<String>,
    pub text: String,
    /// `a:off` inside the shape's `xfrm`.
    pub offset: Option<(f64, f64)>,
    /// `a:ext` inside the shape's `xfrm`.
    pub extent: Option<(f64, f64)>,
    /// Relationship id of the picture's blip (`r:embed`, or `r:link`).
    pub embed: Option<String>,
    /// `p:ph`, when the shape is a placeholder.
    pub placeholder: Option<Placeholder>,
}

/// Placeholder reference of a shape (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// `@type`; absent means an object (body) placeholder.
    pub kind: Option<String>,
    /// `@idx`, 0 when absent.
    pub idx: u32,
}

impl Placeholder {
    /// Placeholder type a slide master uses for this placeholder.
    pub fn base_kind(&self) -> &str {
        match self.kind.as_deref() {
            Some("title") | Some("ctrTitle") => "title",
            Some(kind @ ("dt" | "ftr" | "sldNum" | "hdr")) => kind,
            _ => "body",
        }
    }
}

/// Child coordinate space of a group shape (`p:grpSpPr/a:xfrm`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GroupTransform {
    off: (f64, f64),
    ext: (f64, f64),
    ch_off: (f64, f64),
    ch_ext: (f64, f64),
}

impl GroupTransform {
    /// Map an offset and extent from child space into the parent's space.
    fn apply(
        &self,
        offset: (f64, f64),
        extent: Option<(f64, f64)>,
    ) -> ((f64, f64), Option<(f64, f64)>) {
        let scale_x = scale(self.ext.0, self.ch_ext.0);
        let scale_y = scale(self.ext.1, self.ch_ext.1);
        let offset = (
            self.off.0 + (offset.0 - self.ch_off.0) * scale_x,
            self.off.1 + (offset.1 - self.ch_off.1) * scale_y,
        );
        (offset, extent.map(|(cx, cy)| (cx * scale_x, cy * scale_y)))
    }
}

fn scale(ext: f64, ch_ext: f64) -> f64 {
    if ch_ext == 0.0 {
        1.0
    } else {
        ext / ch_ext
    }
}

fn point(e: &BytesStart, x: &[u8], y: &[u8]) -> (f64, f64) {
    (number_attr(e, x).unwrap_or(0.0), number_attr(e, y).unwrap_or(0.0))
}

impl RawShape {
    fn new(kind: RawKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Frame in EMU; `None` when the shape declares no offset.
    pub fn frame(&self) -> Option<Frame> {
        let (x, y) = self.offset?;
        let (width, height) = self.extent.unwrap_or((0.0, 0.0));
        Some(Frame::new(x, y, width, height))
    }
}

/// Parse every shape of a slide in source order.
///
/// Group shapes are flattened into their children, whose frames are mapped
/// out of the group's child coordinate space. Shapes inside
/// `mc:Fallback` are skipped since the matching `mc:Choice` already carries
/// them.
pub fn parse_slide_xml(xml: &str) -> Result<Vec<RawShape>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut collector = ShapeCollector::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => collector.open(e, false),
            Ok(Event::Empty(ref e)) => collector.open(e, true),
            Ok(Event::Text(ref e)) => {
                if collector.wants_text() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text in slide: {}", e)))?;
                    collector.push_text(&text);
                }
            }
            Ok(Event::End(ref e)) => collector.close(local_name(e.name().as_ref())),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(collector.shapes)
}

#[derive(Debug, Default)]
struct ShapeCollector {
    shapes: Vec<RawShape>,
    current: Option<RawShape>,
    in_xfrm: bool,
    in_text_body: bool,
    in_run_text: bool,
    paragraphs: usize,
    fallback_depth: usize,
    groups: Vec<GroupTransform>,
    in_group_props: bool,
    in_group_xfrm: bool,
}

impl ShapeCollector {
    fn open(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        let local = local_name(name.as_ref());

        if local == b"Fallback" {
            if !empty {
                self.fallback_depth += 1;
            }
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }

        if self.current.is_none() {
            match local {
                b"grpSp" if !empty => {
                    self.groups.push(GroupTransform::default());
                    return;
                }
                b"grpSpPr" if !empty && !self.groups.is_empty() => {
                    self.in_group_props = true;
                    return;
                }
                b"xfrm" if !empty && self.in_group_props => {
                    self.in_group_xfrm = true;
                    return;
                }
                _ => {}
            }
            if self.in_group_xfrm {
                if let Some(group) = self.groups.last_mut() {
                    match local {
                        b"off" => group.off = point(e, b"x", b"y"),
                        b"ext" => group.ext = point(e, b"cx", b"cy"),
                        b"chOff" => group.ch_off = point(e, b"x", b"y"),
                        b"chExt" => group.ch_ext = point(e, b"cx", b"cy"),
                        _ => {}
                    }
                }
                return;
            }
        }

        match local {
            b"sp" => self.begin(RawKind::Text),
            b"pic" => self.begin(RawKind::Picture),
            b"cxnSp" | b"graphicFrame" => self.begin(RawKind::Other),
            _ => {}
        }
        if empty && matches!(local, b"sp" | b"pic" | b"cxnSp" | b"graphicFrame") {
            self.finish();
            return;
        }

        let Some(shape) = self.current.as_mut() else {
            return;
        };

        match local {
            b"cNvPr" if shape.name.is_none() => {
                shape.name = attr(e, b"name");
            }
            b"xfrm" if !empty => {
                self.in_xfrm = true;
            }
            b"off" if self.in_xfrm => {
                shape.offset = Some(point(e, b"x", b"y"));
            }
            b"ext" if self.in_xfrm => {
                shape.extent = Some(point(e, b"cx", b"cy"));
            }
            b"ph" => {
                shape.placeholder = Some(Placeholder {
                    kind: attr(e, b"type"),
                    idx: attr(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0),
                });
            }
            b"blip" => {
                shape.embed = prefixed_attr(e, b"embed").or_else(|| prefixed_attr(e, b"link"));
            }
            b"txBody" if !empty => {
                self.in_text_body = true;
            }
            b"p" if self.in_text_body => {
                if self.paragraphs > 0 {
                    shape.text.push('\n');
                }
                self.paragraphs += 1;
            }
            b"br" if self.in_text_body => {
                shape.text.push('\n');
            }
            b"t" if self.in_text_body && !empty => {
                self.in_run_text = true;
            }
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8]) {
        if local == b"Fallback" && self.fallback_depth > 0 {
            self.fallback_depth -= 1;
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }

        match local {
            b"t" => self.in_run_text = false,
            b"xfrm" => {
                self.in_xfrm = false;
                self.in_group_xfrm = false;
            }
            b"grpSpPr" => self.in_group_props = false,
            b"grpSp" if self.current.is_none() => {
                self.groups.pop();
            }
            b"txBody" => self.in_text_body = false,
            b"sp" | b"pic" | b"cxnSp" | b"graphicFrame" => self.finish(),
            _ => {}
        }
    }

    fn wants_text(&self) -> bool {
        self.in_run_text && self.current.is_some()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(shape) = self.current.as_mut() {
            shape.text.push_str(text);
        }
    }

    fn begin(&mut self, kind: RawKind) {
        if self.current.is_some() {
            log::debug!("Nested shape element; closing the outer shape early");
            self.finish();
        }
        self.current = Some(RawShape::new(kind));
        self.in_xfrm = false;
        self.in_text_body = false;
        self.in_run_text = false;
        self.paragraphs = 0;
    }

    fn finish(&mut self) {
        if let Some(mut shape) = self.current.take() {
            shape.text = shape.text.trim().to_string();
            if shape.kind == RawKind::Text && shape.text.is_empty() {
                shape.kind = RawKind::Other;
            }
            if let Some(offset) = shape.offset {
                let (offset, extent) = self
                    .groups
                    .iter()
                    .rev()
                    .fold((offset, shape.extent), |(offset, extent), group| {
                        group.apply(offset, extent)
                    });
                shape.offset = Some(offset);
                shape.extent = extent;
            }
            self.shapes.push(shape);
        }
        self.in_xfrm = false;
        self.in_text_body = false;
        self.in_run_text = false;
        self.paragraphs = 0;
    }
}
