//! # redocx
//!
//! House-style reflow engine for academic DOCX manuscripts.
//!
//! This library loads a manuscript, infers the semantic role of every
//! paragraph (title, authors, headings, abstract, references) from
//! weak signals, and rewrites structural and visual formatting to a
//! publication house style: fonts and sizes per role, page geometry,
//! columns, line numbering, running headers and footers with page
//! number fields, isolated and rescaled inline images, and tables
//! normalized to the usable page width.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redocx::format_file;
//!
//! fn main() -> redocx::Result<()> {
//!     // Reflow with the default policy and write the result.
//!     let output = format_file("manuscript.docx", "manuscript.formatted.docx")?;
//!     println!("wrote {}", output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Role classification**: priority-ordered style/text rules with a
//!   deterministic `body` fallback
//! - **Structural surgery**: missing DOI and paper-type insertion,
//!   text/image paragraph splitting, heading-relative indentation
//! - **Layout rewrite**: margins, columns, line numbers, mirrored
//!   running headers with well-formed PAGE fields, masthead pages
//! - **Policy-driven**: one engine, per-journal [`StylePolicy`] records

pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod writer;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use engine::{
    classify, DoiMatch, FormatSpec, FrontMatter, Pipeline, PolicyRegistry, ReferencesMatch,
    RoleFormats, SemanticRole, StylePolicy,
};
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, Paragraph, ParagraphProps, Run, RunContent, RunProps, Section,
    Table, TableCell, TableRow,
};
pub use parser::{DocxParser, ErrorMode, ParseOptions};
pub use writer::DocxWriter;

use std::path::{Path, PathBuf};

/// Parse a DOCX file into the editable document tree.
///
/// # Example
///
/// ```no_run
/// use redocx::parse_file;
///
/// let doc = parse_file("manuscript.docx").unwrap();
/// println!("paragraphs: {}", doc.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = DocxParser::open(path)?;
    parser.parse()
}

/// Parse a DOCX from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = DocxParser::from_bytes(data)?;
    parser.parse()
}

/// Reflow a DOCX file with the default policy and write the result.
///
/// Output collision is the caller's concern: pass a path unique to
/// this conversion.
pub fn format_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<PathBuf> {
    format_file_with_policy(input, output, StylePolicy::default())
}

/// Reflow a DOCX file with an explicit policy and write the result.
pub fn format_file_with_policy<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    policy: StylePolicy,
) -> Result<PathBuf> {
    let mut document = parse_file(input)?;
    Pipeline::new(policy).format(&mut document)?;
    DocxWriter::write_file(&document, output)
}

/// Reflow DOCX bytes with an explicit policy.
pub fn format_bytes(data: &[u8], policy: &StylePolicy) -> Result<Vec<u8>> {
    let mut document = parse_bytes(data)?;
    Pipeline::new(policy.clone()).format(&mut document)?;
    DocxWriter::write_bytes(&document)
}

/// Builder for parsing and reflowing DOCX manuscripts.
///
/// # Example
///
/// ```no_run
/// use redocx::Redocx;
///
/// let output = Redocx::new()
///     .with_policy_name("smart-city")?
///     .lenient()
///     .format("manuscript.docx", "manuscript.formatted.docx")?;
/// # Ok::<(), redocx::Error>(())
/// ```
pub struct Redocx {
    policy: StylePolicy,
    parse_options: ParseOptions,
}

impl Redocx {
    /// Create a new builder with the default policy.
    pub fn new() -> Self {
        Self {
            policy: StylePolicy::default(),
            parse_options: ParseOptions::default(),
        }
    }

    /// Use an explicit style policy.
    pub fn with_policy(mut self, policy: StylePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Look up a built-in policy by name.
    pub fn with_policy_name(mut self, name: &str) -> Result<Self> {
        self.policy = PolicyRegistry::with_defaults().get(name)?.clone();
        Ok(self)
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Enable or disable carrying media parts.
    pub fn with_media(mut self, keep: bool) -> Self {
        self.parse_options = self.parse_options.with_media(keep);
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    /// Parse, reflow, and write a manuscript.
    pub fn format<P: AsRef<Path>, Q: AsRef<Path>>(self, input: P, output: Q) -> Result<PathBuf> {
        let parser = DocxParser::open_with_options(input, self.parse_options)?;
        let mut document = parser.parse()?;
        Pipeline::new(self.policy).format(&mut document)?;
        DocxWriter::write_file(&document, output)
    }

    /// Parse, reflow, and serialize manuscript bytes.
    pub fn format_bytes(self, data: &[u8]) -> Result<Vec<u8>> {
        let parser = DocxParser::from_bytes_with_options(data, self.parse_options)?;
        let mut document = parser.parse()?;
        Pipeline::new(self.policy).format(&mut document)?;
        DocxWriter::write_bytes(&document)
    }
}

impl Default for Redocx {
    fn default() -> Self {
        Self::new()
    }
}
