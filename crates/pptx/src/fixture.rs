//! In-memory PPTX builder for tests.
//!
//! Produces the minimal set of parts this crate reads: `presentation.xml`,
//! its relationships, slide parts with their relationships, media, and
//! optional slide layouts and masters.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_LAYOUT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_MASTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

/// Offset and extent in EMU: (x, y, cx, cy).
pub type FixtureFrame = (i64, i64, i64, i64);

/// A deck under construction.
#[derive(Debug, Default)]
pub struct FixtureDeck {
    size: Option<(i64, i64)>,
    slides: Vec<FixtureSlide>,
}

impl FixtureDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `p:sldSz`. Without it the deck has no declared size.
    pub fn with_size(mut self, cx: i64, cy: i64) -> Self {
        self.size = Some((cx, cy));
        self
    }

    pub fn slide(mut self, slide: FixtureSlide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Zip the deck into PPTX bytes.
    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let mut slide_ids = String::new();
        let mut presentation_rels = String::new();
        let mut media = Vec::new();

        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            let rel_id = format!("rId{}", number + 1);
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + number, rel_id));
            presentation_rels.push_str(&relationship(
                &rel_id,
                REL_SLIDE,
                &format!("slides/slide{}.xml", number),
            ));

            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/slide{}.xml", number),
                slide.to_xml("sld").as_bytes(),
            );

            let mut slide_rels = String::new();
            if let Some(layout) = &slide.layout {
                slide_rels.push_str(&relationship(
                    "rId1",
                    REL_LAYOUT,
                    &format!("../slideLayouts/slideLayout{}.xml", number),
                ));
                write_part(
                    &mut zip,
                    options,
                    &format!("ppt/slideLayouts/slideLayout{}.xml", number),
                    layout.to_xml("sldLayout").as_bytes(),
                );
                if let Some(master) = &layout.layout {
                    write_part(
                        &mut zip,
                        options,
                        &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", number),
                        relationships(&relationship(
                            "rId1",
                            REL_MASTER,
                            &format!("../slideMasters/slideMaster{}.xml", number),
                        ))
                        .as_bytes(),
                    );
                    write_part(
                        &mut zip,
                        options,
                        &format!("ppt/slideMasters/slideMaster{}.xml", number),
                        master.to_xml("sldMaster").as_bytes(),
                    );
                }
            }
            for (id, target) in &slide.rels {
                slide_rels.push_str(&relationship(id, REL_IMAGE, target));
            }
            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships(&slide_rels).as_bytes(),
            );

            media.extend(slide.media.iter().cloned());
        }

        for (name, data) in media {
            write_part(&mut zip, options, &format!("ppt/media/{}", name), &data);
        }

        let size = self
            .size
            .map(|(cx, cy)| format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy))
            .unwrap_or_default();
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst>{}</p:presentation>"#,
            NAMESPACES, slide_ids, size
        );
        write_part(&mut zip, options, "ppt/presentation.xml", presentation.as_bytes());
        write_part(
            &mut zip,
            options,
            "ppt/_rels/presentation.xml.rels",
            relationships(&presentation_rels).as_bytes(),
        );
        write_part(
            &mut zip,
            options,
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        );

        zip.finish().expect("finish fixture zip").into_inner()
    }
}

/// A slide under construction.
#[derive(Debug, Default)]
pub struct FixtureSlide {
    shapes: Vec<String>,
    rels: Vec<(String, String)>,
    media: Vec<(String, Vec<u8>)>,
    raw: Option<String>,
    /// The slide's layout, or for a layout, its master.
    layout: Option<Box<FixtureSlide>>,
}

impl FixtureSlide {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slide part with verbatim (possibly malformed) content.
    pub fn raw(xml: &str) -> Self {
        Self {
            raw: Some(xml.to_string()),
            ..Self::default()
        }
    }

    /// Add a text shape; lines become separate paragraphs.
    pub fn text(mut self, text: &str, frame: Option<FixtureFrame>) -> Self {
        let id = self.shapes.len() + 2;
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(line)))
            .collect();
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            id,
            id,
            xfrm(frame),
            paragraphs
        ));
        self
    }

    /// Add a text placeholder (`p:ph`). `None` leaves the attribute out.
    pub fn placeholder(
        mut self,
        kind: Option<&str>,
        idx: Option<u32>,
        text: &str,
        frame: Option<FixtureFrame>,
    ) -> Self {
        let id = self.shapes.len() + 2;
        let kind = kind.map(|k| format!(r#" type="{}""#, k)).unwrap_or_default();
        let idx = idx.map(|i| format!(r#" idx="{}""#, i)).unwrap_or_default();
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(line)))
            .collect();
        self.shapes.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Placeholder {}"/><p:cNvSpPr/><p:nvPr><p:ph{}{}/></p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            id,
            id,
            kind,
            idx,
            xfrm(frame),
            paragraphs
        ));
        self
    }

    /// Attach a slide layout, linked from the slide as `rId1`.
    pub fn with_layout(mut self, layout: FixtureSlide) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    /// Attach a slide master to a layout.
    pub fn with_master(self, master: FixtureSlide) -> Self {
        self.with_layout(master)
    }

    /// Add a picture backed by a media part named `name`.
    pub fn image(mut self, name: &str, data: Vec<u8>, frame: Option<FixtureFrame>) -> Self {
        let rel_id = format!("rId{}", self.rels.len() + 2);
        self.rels.push((rel_id.clone(), format!("../media/{}", name)));
        self.media.push((name.to_string(), data));
        self.push_picture(&rel_id, frame);
        self
    }

    /// Add a picture whose relationship id resolves to nothing.
    pub fn dangling_image(mut self, rel_id: &str) -> Self {
        self.push_picture(rel_id, None);
        self
    }

    fn push_picture(&mut self, rel_id: &str, frame: Option<FixtureFrame>) {
        let id = self.shapes.len() + 2;
        self.shapes.push(format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}</p:spPr></p:pic>"#,
            id,
            id,
            rel_id,
            xfrm(frame)
        ));
    }

    fn to_xml(&self, root: &str) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:{root} {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:{root}>"#,
            NAMESPACES,
            self.shapes.concat()
        )
    }
}

fn xfrm(frame: Option<FixtureFrame>) -> String {
    match frame {
        Some((x, y, cx, cy)) => format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            x, y, cx, cy
        ),
        None => String::new(),
    }
}

fn relationship(id: &str, rel_type: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
        id, rel_type, target
    )
}

fn relationships(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_part(zip: &mut ZipWriter<Cursor<Vec<u8>>>, options: FileOptions, name: &str, data: &[u8]) {
    zip.start_file(name, options).expect("start fixture part");
    zip.write_all(data).expect("write fixture part");
}
