//! PPTX package translation engine.
//!
//! A `.pptx` file is a ZIP package of XML parts, one per slide. This
//! crate opens the package, collects the visible text runs of each
//! slide part in document order, and rebuilds the package with
//! replacement text in the same positions, leaving every untouched
//! byte of the package intact.

pub mod package;
pub mod pipeline;
pub mod text;
pub mod xml;

pub use package::SlidePackage;
pub use pipeline::{
    extract_package_texts, extract_slide_texts, rebuild_package, rebuild_slides,
    split_translations, translate_package, translate_package_with_progress, SLIDES_PREFIX,
    SLIDE_EXTENSION,
};
pub use text::{collect_texts, inject_texts, TEXT_RUN_TAG};
pub use xml::{XmlDocument, XmlElement, XmlNode};
