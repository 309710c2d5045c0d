//! Error types for the porec-core library.

use thiserror::Error;

/// Main error type for the porec library.
#[derive(Error, Debug)]
pub enum PorecError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Storage collaborator error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by the storage collaborator.
///
/// Missing reference data is a hard failure: the engine never guesses in
/// the absence of catalog, branch, or client rows. Unmatched products and
/// unresolved branches are NOT errors; they surface as data on the order.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The named client does not exist.
    #[error("client not found: {0}")]
    ClientNotFound(String),

    /// Referenced order or entity does not exist.
    #[error("missing entity: {0}")]
    MissingEntity(String),

    /// Backend-specific failure (connection, constraint, ...).
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result type for the porec library.
pub type Result<T> = std::result::Result<T, PorecError>;
