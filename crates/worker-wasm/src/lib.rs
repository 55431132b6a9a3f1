//! WASM-compatible wrapper for PPTX translation.
//!
//! Exposes the two halves of the pipeline to JavaScript: extract the
//! slide texts, then rebuild the package with translated texts. The
//! translation call itself happens on the JS side between the two, so
//! the translator stays an external collaborator.

use deck_core::{JobPhase, SlideTexts};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Extract the translatable texts of a presentation.
///
/// # Arguments
/// * `data` - The raw bytes of the .pptx file
///
/// # Returns
/// A JavaScript array of `{ path, texts }` objects, one per slide with
/// qualifying text, or throws on error.
#[wasm_bindgen]
pub fn extract_texts(data: &[u8]) -> Result<JsValue, JsValue> {
    let slides = extract_texts_impl(data).map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&slides)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn extract_texts_impl(data: &[u8]) -> deck_core::Result<Vec<SlideTexts>> {
    let slides = deck_pptx::extract_package_texts(data)?;
    if slides.iter().all(|s| s.is_empty()) {
        return Err(deck_core::Error::NoTranslatableText);
    }
    Ok(slides)
}

/// Rebuild a presentation with translated texts.
///
/// # Arguments
/// * `data` - The raw bytes of the original .pptx file
/// * `slides` - Array of `{ path, texts }` objects as returned by
///   [`extract_texts`], with the texts translated in place
///
/// # Returns
/// The bytes of the new .pptx file, or throws on error. Per-slide text
/// counts are validated against the original before anything is
/// rewritten.
#[wasm_bindgen]
pub fn rebuild_presentation(data: &[u8], slides: JsValue) -> Result<Vec<u8>, JsValue> {
    let slides: Vec<SlideTexts> = serde_wasm_bindgen::from_value(slides)
        .map_err(|e| JsValue::from_str(&format!("Invalid slides array: {}", e)))?;

    deck_pptx::rebuild_package(data, &slides).map_err(to_js_error)
}

/// Derive the download filename for a translated package.
#[wasm_bindgen]
pub fn translated_filename(original: &str) -> String {
    deck_core::translated_filename(original)
}

/// Human-readable status message for a job phase string
/// (`"idle" | "processing" | "translating" | "generating" | "success" | "error"`).
#[wasm_bindgen]
pub fn phase_message(phase: JsValue) -> Result<String, JsValue> {
    let phase: JobPhase = serde_wasm_bindgen::from_value(phase)
        .map_err(|e| JsValue::from_str(&format!("Invalid phase: {}", e)))?;
    Ok(phase.message().to_string())
}

fn to_js_error(e: deck_core::Error) -> JsValue {
    JsValue::from_str(&format!("{} [{}]", e, e.kind()))
}
