//! Error types for the csv2pdf library.
//!
//! A fill run is all-or-nothing per failure: the first error from any stage
//! aborts the run and is returned as `Err(Csv2PdfError)` from
//! [`crate::fill::fill`]. Files already written by earlier rows are left in
//! place.
//!
//! Variants are grouped into coarse classes via [`Csv2PdfError::kind`] so a
//! caller can decide how to report a failure without matching every variant.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the csv2pdf library.
#[derive(Debug, Error)]
pub enum Csv2PdfError {
    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other failure while reading an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write a filled PDF to the output directory.
    #[error("Failed to write output file '{path}': {source}\nThe output directory must already exist.")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── CSV errors ────────────────────────────────────────────────────────
    /// The CSV content is malformed.
    #[error("CSV '{path}' could not be parsed: {detail}")]
    CsvParse { path: PathBuf, detail: String },

    /// A binding or slug rule addressed a cell the row does not have.
    #[error("Row {row} has no cell at column {column} (row has {len} cells)")]
    MissingCell {
        row: usize,
        column: usize,
        len: usize,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF parsed but carries no interactive form.
    #[error("PDF '{path}' has no interactive form (/AcroForm)\nIs this the fillable template?")]
    MissingForm { path: PathBuf },

    /// The named field exists but does not hold text.
    #[error("Form field '{field}' is not a text field (type: {found})")]
    NotATextField { field: String, found: String },

    /// A binding references a field the loaded form does not have.
    #[error("Form field '{field}' not found on template.\nAvailable fields: {}", .available.join(", "))]
    FieldNotFound {
        field: String,
        available: Vec<String>,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bindings file could not be decoded.
    #[error("Invalid bindings file '{path}': {detail}")]
    InvalidBindings { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`Csv2PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing, unreadable or unwritable.
    Io,
    /// Malformed CSV content or a row too short for the bindings.
    Parse,
    /// Malformed or form-less PDF, or a field of the wrong type.
    Format,
    /// A binding names a field absent from the form.
    FieldNotFound,
    /// Rejected configuration or bindings.
    Config,
    /// Anything else.
    Internal,
}

impl Csv2PdfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::ReadFailed { .. }
            | Self::OutputWriteFailed { .. } => ErrorKind::Io,
            Self::CsvParse { .. } | Self::MissingCell { .. } => ErrorKind::Parse,
            Self::NotAPdf { .. }
            | Self::CorruptPdf { .. }
            | Self::MissingForm { .. }
            | Self::NotATextField { .. } => ErrorKind::Format,
            Self::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            Self::InvalidConfig(_) | Self::InvalidBindings { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map an `io::Error` raised while reading `path` to the matching variant.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::ReadFailed { path, source },
        }
    }
}
