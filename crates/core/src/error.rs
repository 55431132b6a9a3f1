//! Error types for PPTX translation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write underlying bytes.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The input bytes are not a valid PPTX (ZIP) package.
    #[error("Not a valid PPTX package: {0}")]
    InvalidPackage(String),

    /// A requested entry does not exist inside the package.
    #[error("Entry not found in package: {0}")]
    EntryNotFound(String),

    /// A slide part failed to parse or serialize as XML.
    #[error("Slide XML error: {0}")]
    XmlError(String),

    /// The presentation contains no text eligible for translation.
    #[error("No translatable text found in the presentation")]
    NoTranslatableText,

    /// The translator returned a different number of texts than requested.
    #[error("Translator returned {actual} texts, expected {expected}")]
    TranslationCountMismatch { expected: usize, actual: usize },

    /// The external translation service failed or returned malformed content.
    #[error("Translation service error: {0}")]
    TranslationFailed(String),
}

impl Error {
    /// Stable machine-readable kind for this error.
    ///
    /// Callers that surface errors across a language boundary (e.g. the
    /// WASM worker) key on this instead of the display message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::IoError(_) => "io",
            Error::InvalidPackage(_) => "invalid_package",
            Error::EntryNotFound(_) => "entry_not_found",
            Error::XmlError(_) => "xml",
            Error::NoTranslatableText => "no_translatable_text",
            Error::TranslationCountMismatch { .. } => "translation_count_mismatch",
            Error::TranslationFailed(_) => "translation_failed",
        }
    }
}
