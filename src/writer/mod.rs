//! DOCX serialization module.

mod document_xml;
mod header_footer;
mod package;

pub use package::DocxWriter;
