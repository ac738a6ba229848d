//! Error types for kollect operations.

use thiserror::Error;

/// Errors that can occur while decoding document metadata or working
/// with the collection index.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Magic/signature check failed: the file is not of the claimed format.
    #[error("not a {0} file: bad signature")]
    FormatMismatch(&'static str),

    /// A structurally-expected record is missing or internally inconsistent.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// A required field is absent where the format mandates it.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// One field failed to decode. Recovered locally: the assembler
    /// drops the field, never the document.
    #[error("encoding failure in field: {0}")]
    EncodingFailure(&'static str),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
