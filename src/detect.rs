//! DOCX format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// DOCX package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Whether the package carries a styles part
    pub has_styles: bool,
    /// Number of entries in the ZIP container
    pub entry_count: usize,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({} parts)", self.entry_count)
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Package part that makes a ZIP archive a WordprocessingML document.
const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Detect DOCX format from a file path.
///
/// # Arguments
/// * `path` - Path to the DOCX file
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a valid DOCX package
/// * `Err(Error::UnknownFormat)` if the file is not a DOCX
///
/// # Example
/// ```no_run
/// use redocx::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("manuscript.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect DOCX format from bytes.
///
/// Checks the ZIP magic, then probes the container for
/// `word/document.xml`. A plain ZIP without that part (e.g. an XLSX)
/// is rejected.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if data.len() < ZIP_MAGIC.len() || !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;
    let names: Vec<&str> = archive.file_names().collect();

    if !names.iter().any(|n| *n == DOCUMENT_PART) {
        return Err(Error::UnknownFormat);
    }

    Ok(DocxFormat {
        has_styles: names.iter().any(|n| *n == STYLES_PART),
        entry_count: names.len(),
    })
}

/// Check if a file is a valid DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a valid DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
