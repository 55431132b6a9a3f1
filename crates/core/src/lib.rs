//! Core domain types, error taxonomy, and the translator boundary
//! for PPTX translation.

pub mod error;
pub mod translator;
pub mod types;

pub use error::{Error, Result};
pub use translator::Translator;
pub use types::{translated_filename, JobPhase, SlideTexts};
