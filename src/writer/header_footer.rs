//! Emission of header and footer parts.

use super::document_xml::{write_blocks, PART_NAMESPACES};
use crate::error::Result;
use crate::model::HeaderFooter;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serialize one header (`w:hdr`) or footer (`w:ftr`) part.
pub(crate) fn write_header_footer_part(content: &HeaderFooter, root: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut start = BytesStart::new(root.to_string());
    for (key, value) in PART_NAMESPACES {
        start.push_attribute((*key, *value));
    }
    writer.write_event(Event::Start(start))?;

    if content.blocks.is_empty() {
        // An explicitly cleared slot still gets a part so the unlink
        // takes effect; Word expects at least an empty paragraph.
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    } else {
        write_blocks(&mut writer, &content.blocks, None)?;
    }

    writer.write_event(Event::End(BytesEnd::new(root.to_string())))?;
    Ok(writer.into_inner().into_inner())
}
