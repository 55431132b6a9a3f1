//! Domain types for presentation translation jobs.

use serde::{Deserialize, Serialize};

/// Filename prefix for the translated output package.
pub const TRANSLATED_PREFIX: &str = "translated-";

/// The translatable texts of one slide part, in document order.
///
/// `path` is the entry's path inside the package (e.g.
/// `ppt/slides/slide1.xml`) and is the identity used to write the
/// translated part back to the same place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideTexts {
    /// Archive path of the slide part.
    pub path: String,

    /// Non-empty text run values, in traversal order.
    pub texts: Vec<String>,
}

impl SlideTexts {
    /// Create a new slide text set.
    pub fn new(path: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            path: path.into(),
            texts,
        }
    }

    /// Number of translatable texts on this slide.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether this slide has no translatable text.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Phases of a translation job, in the order they occur.
///
/// Reported to callers so they can show progress; `Success` and `Error`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    /// Waiting for a file.
    Idle,
    /// Reading the package and extracting text.
    Processing,
    /// Waiting on the external translation service.
    Translating,
    /// Rebuilding slide parts and writing the output package.
    Generating,
    /// Job finished; output is available.
    Success,
    /// Job failed; see the accompanying error.
    Error,
}

impl JobPhase {
    /// Human-readable status message for this phase.
    pub fn message(&self) -> &'static str {
        match self {
            JobPhase::Idle => "Select a file to begin",
            JobPhase::Processing => "Reading presentation file...",
            JobPhase::Translating => "Translating extracted text...",
            JobPhase::Generating => "Generating translated file...",
            JobPhase::Success => "Translation complete! The new file is ready to download.",
            JobPhase::Error => "Translation failed",
        }
    }
}

/// Derive the output filename for a translated package.
pub fn translated_filename(original: &str) -> String {
    format!("{}{}", TRANSLATED_PREFIX, original)
}
