//! Document model types for WordprocessingML content.
//!
//! This module defines the editable in-memory tree that bridges DOCX
//! parsing and the reflow engine. Paragraphs, runs, sections, and tables
//! are plain data; the engine mutates them in place and the writer
//! serializes the result back into a package.

mod document;
mod paragraph;
mod section;
mod table;

pub use document::{Block, Document, MediaPart, Metadata, Relationship};
pub use paragraph::{
    Alignment, BreakKind, Drawing, Extent, FieldCharKind, Paragraph, ParagraphProps, Run,
    RunContent, RunProps,
};
pub use section::{
    Columns, HeaderFooter, HeaderFooterSlot, LineNumbering, LineNumberRestart, PageGeometry,
    PageNumbering, Section, SectionStart,
};
pub use table::{Table, TableCell, TableRow};

/// Twips per centimeter (1 cm = 567 twentieths of a point).
pub const TWIPS_PER_CM: f64 = 567.0;

/// Convert centimeters to twips.
pub fn cm_to_twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

/// Convert inches to twips (1 in = 1440 twips).
pub fn inches_to_twips(inches: f64) -> i64 {
    (inches * 1440.0).round() as i64
}

/// EMU per centimeter (914400 per inch / 2.54).
pub const EMU_PER_CM: f64 = 360000.0;

/// Convert centimeters to EMU.
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM).round() as i64
}
