//! Error types for flatfill library.

use std::io;
use thiserror::Error;

/// Result type alias for flatfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while analyzing or filling a template.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range string.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The template configuration cannot be used for filling.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single field definition is unusable; the field is skipped.
    #[error("Malformed field: {0}")]
    MalformedField(String),

    /// The template configuration could not be decoded.
    #[error("Template config error: {0}")]
    Template(#[from] serde_json::Error),

    /// Error while building overlay content or writing the output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The background fill worker stopped abnormally.
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
