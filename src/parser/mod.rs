//! DOCX parsing module.

mod docx_parser;
mod options;
mod styles;

pub use docx_parser::DocxParser;
pub use options::{ErrorMode, ParseOptions};
pub use styles::{parse_style_names, StyleMap};
