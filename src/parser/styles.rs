//! Style part parsing: styleId to display-name resolution.
//!
//! Paragraph properties reference styles by id ("Heading1") while the
//! classifier matches on display names ("Heading 1"); this map bridges
//! the two.

use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Map from style id to display name.
pub type StyleMap = HashMap<String, String>;

/// Parse `word/styles.xml` into a styleId → name map.
pub fn parse_style_names(xml: &str) -> Result<StyleMap> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut map = StyleMap::new();
    let mut current_id: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:style" => {
                    current_id = super::docx_parser::get_attr(&e, b"w:styleId");
                }
                b"w:name" => {
                    if let (Some(id), Some(name)) = (
                        current_id.as_ref(),
                        super::docx_parser::get_attr(&e, b"w:val"),
                    ) {
                        map.insert(id.clone(), name);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:style" {
                    current_id = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}
