//! Reader for `ppt/presentation.xml`: slide size and slide order.

use crate::xml::{local_name, number_attr, prefixed_attr};
use quick_xml::events::Event;
use quick_xml::Reader;
use slidepdf_core::{Error, Result, SlideSize};

/// Deck-level facts read from the presentation part.
#[derive(Debug, Default, PartialEq)]
pub struct PresentationInfo {
    /// Declared slide size (`p:sldSz`), if present and positive.
    pub slide_size: Option<SlideSize>,

    /// Relationship ids of the slides in presentation order (`p:sldIdLst`).
    pub slide_ids: Vec<String>,
}

/// Parse the XML of `ppt/presentation.xml`.
pub fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut info = PresentationInfo::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_slide_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sldSz" => {
                        let cx = number_attr(e, b"cx");
                        let cy = number_attr(e, b"cy");
                        if let (Some(cx), Some(cy)) = (cx, cy) {
                            if cx > 0.0 && cy > 0.0 {
                                info.slide_size = Some(SlideSize::new(cx, cy));
                            }
                        }
                    }
                    b"sldIdLst" => {
                        in_slide_list = true;
                    }
                    b"sldId" if in_slide_list => {
                        if let Some(id) = prefixed_attr(e, b"id") {
                            info.slide_ids.push(id);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == b"sldIdLst" {
                    in_slide_list = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presentation() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst>
    <p:sldId id="257" r:id="rId3"/>
    <p:sldId id="256" r:id="rId2"/>
  </p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#;

        let info = parse_presentation(xml).unwrap();
        assert_eq!(info.slide_ids, vec!["rId3", "rId2"]);
        assert_eq!(info.slide_size, Some(SlideSize::new(12_192_000.0, 6_858_000.0)));
    }

    #[test]
    fn test_missing_size_and_list() {
        let info = parse_presentation("<p:presentation/>").unwrap();
        assert_eq!(info, PresentationInfo::default());
    }

    #[test]
    fn test_zero_size_is_ignored() {
        let info = parse_presentation(r#"<p:presentation><p:sldSz cx="0" cy="100"/></p:presentation>"#)
            .unwrap();
        assert_eq!(info.slide_size, None);
    }
}
