//! Error types for the redocx library.

use std::io;
use thiserror::Error;

/// Result type alias for redocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reformatting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as DOCX.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// Error reading or writing the ZIP container.
    #[error("Package error: {0}")]
    Package(String),

    /// Error parsing WordprocessingML markup.
    #[error("XML error: {0}")]
    Xml(String),

    /// A required package part is missing (e.g. word/document.xml).
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A referenced asset (masthead or footer image) is unavailable.
    ///
    /// This aborts the whole conversion: output without the required
    /// branding is not considered valid.
    #[error("Resource not found: {0}")]
    ResourceMissing(String),

    /// A style policy could not be resolved or deserialized.
    #[error("Invalid style policy: {0}")]
    InvalidPolicy(String),

    /// Error serializing the rewritten document.
    #[error("Write error: {0}")]
    Write(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("entry not found in package".into())
            }
            _ => Error::Package(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(
            err.to_string(),
            "Unknown file format: not a valid DOCX package"
        );

        let err = Error::ResourceMissing("images/left.jpg".into());
        assert_eq!(err.to_string(), "Resource not found: images/left.jpg");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::MissingPart(_)));
    }
}
