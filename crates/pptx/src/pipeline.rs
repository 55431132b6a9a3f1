//! End-to-end translation pipeline.
//!
//! Extraction and reinsertion are two independent passes over the same
//! package: the first collects per-slide text sets, the second re-parses
//! each slide from its original bytes and writes the translated text
//! into the same traversal positions. Slide enumeration order is the
//! archive's natural order in both passes, which is what keeps the
//! flattened translation batch and the per-slide split aligned.

use crate::package::SlidePackage;
use crate::text::{collect_texts, inject_texts};
use crate::xml::XmlDocument;
use deck_core::{Error, JobPhase, Result, SlideTexts, Translator};

/// Directory of slide parts inside the package.
pub const SLIDES_PREFIX: &str = "ppt/slides/";

/// Extension of slide parts. `.rels` relationship parts under the same
/// directory do not match.
pub const SLIDE_EXTENSION: &str = ".xml";

/// Extract the translatable text sets of every slide part.
///
/// Slides that fail to parse are logged and contribute nothing; slides
/// with no qualifying text are dropped from the result. Either way
/// their bytes pass through the package unchanged.
pub fn extract_slide_texts(package: &mut SlidePackage) -> Result<Vec<SlideTexts>> {
    let mut slides = Vec::new();

    for path in package.entry_names(SLIDES_PREFIX, SLIDE_EXTENSION) {
        let bytes = package.read_entry(&path)?;
        match XmlDocument::parse(&bytes) {
            Ok(doc) => {
                let texts = collect_texts(doc.root());
                if texts.is_empty() {
                    log::debug!("No translatable text in '{}'", path);
                } else {
                    slides.push(SlideTexts::new(path, texts));
                }
            }
            Err(e) => {
                log::warn!("Skipping unparseable slide '{}': {}", path, e);
            }
        }
    }

    Ok(slides)
}

/// Split the flat translated batch back into per-slide sets, matching
/// the original per-slide counts.
pub fn split_translations(slides: &[SlideTexts], translated: Vec<String>) -> Vec<SlideTexts> {
    debug_assert_eq!(
        slides.iter().map(|s| s.len()).sum::<usize>(),
        translated.len()
    );

    let mut remaining = translated.into_iter();
    slides
        .iter()
        .map(|slide| {
            let texts = remaining.by_ref().take(slide.len()).collect();
            SlideTexts::new(slide.path.clone(), texts)
        })
        .collect()
}

/// Write translated text sets back into their slide parts.
///
/// Each slide is re-parsed fresh from its original bytes before
/// injection, so the pass depends only on tree shape. A slide that
/// fails to parse or serialize keeps its original bytes; failures here
/// never abort the job.
pub fn rebuild_slides(package: &mut SlidePackage, slides: &[SlideTexts]) {
    for slide in slides {
        let original = match package.read_entry(&slide.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping missing slide '{}': {}", slide.path, e);
                continue;
            }
        };

        match rebuild_slide(&original, &slide.texts) {
            Ok(bytes) => package.write_entry(&slide.path, bytes),
            Err(e) => {
                log::warn!("Keeping original bytes for '{}': {}", slide.path, e);
            }
        }
    }
}

fn rebuild_slide(bytes: &[u8], texts: &[String]) -> Result<Vec<u8>> {
    let mut doc = XmlDocument::parse(bytes)?;
    let replaced = inject_texts(doc.root_mut(), texts);
    log::debug!("Replaced {} text runs", replaced);
    doc.to_bytes()
}

/// Extract per-slide texts from raw package bytes.
///
/// Convenience entry point for hosts that run the translation call
/// themselves between extraction and [`rebuild_package`].
pub fn extract_package_texts(bytes: &[u8]) -> Result<Vec<SlideTexts>> {
    let mut package = SlidePackage::open(bytes.to_vec())?;
    extract_slide_texts(&mut package)
}

/// Rebuild a package from raw bytes and externally translated slides.
///
/// Per-slide counts are validated against a fresh extraction of the
/// same bytes before anything is rewritten; a mismatch aborts with
/// [`Error::TranslationCountMismatch`] and no output is produced.
pub fn rebuild_package(bytes: &[u8], slides: &[SlideTexts]) -> Result<Vec<u8>> {
    let mut package = SlidePackage::open(bytes.to_vec())?;

    let current = extract_slide_texts(&mut package)?;
    for slide in slides {
        if let Some(original) = current.iter().find(|s| s.path == slide.path) {
            if original.len() != slide.len() {
                return Err(Error::TranslationCountMismatch {
                    expected: original.len(),
                    actual: slide.len(),
                });
            }
        }
    }

    rebuild_slides(&mut package, slides);
    package.finalize()
}

/// Run the whole translation job: extract, translate once, reinsert.
pub fn translate_package<T: Translator>(bytes: &[u8], translator: &T) -> Result<Vec<u8>> {
    translate_package_with_progress(bytes, translator, |_| {})
}

/// [`translate_package`] with phase notifications.
///
/// `progress` receives `Processing`, `Translating`, and `Generating`
/// transitions; terminal `Success`/`Error` reporting belongs to the
/// caller, who sees the returned `Result`.
pub fn translate_package_with_progress<T: Translator>(
    bytes: &[u8],
    translator: &T,
    mut progress: impl FnMut(JobPhase),
) -> Result<Vec<u8>> {
    progress(JobPhase::Processing);
    let mut package = SlidePackage::open(bytes.to_vec())?;
    let slides = extract_slide_texts(&mut package)?;

    let batch: Vec<String> = slides.iter().flat_map(|s| s.texts.iter().cloned()).collect();
    if batch.is_empty() {
        return Err(Error::NoTranslatableText);
    }

    progress(JobPhase::Translating);
    let translated = translator.translate_batch(&batch)?;
    if translated.len() != batch.len() {
        return Err(Error::TranslationCountMismatch {
            expected: batch.len(),
            actual: translated.len(),
        });
    }

    progress(JobPhase::Generating);
    let plan = split_translations(&slides, translated);
    rebuild_slides(&mut package, &plan);
    package.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn slide_xml(texts: &[&str]) -> Vec<u8> {
        let runs: String = texts
            .iter()
            .map(|t| format!("<a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r>", t))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n\
             <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody><a:p>{}</a:p></p:txBody></p:sp>\
             </p:spTree></p:cSld></p:sld>",
            runs
        )
        .into_bytes()
    }

    fn build_package(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn entry_bytes(package_bytes: &[u8], path: &str) -> Vec<u8> {
        let mut package = SlidePackage::open(package_bytes.to_vec()).unwrap();
        package.read_entry(path).unwrap()
    }

    fn uppercase(texts: &[String]) -> Result<Vec<String>> {
        Ok(texts.iter().map(|t| t.to_uppercase()).collect())
    }

    fn three_slide_package() -> Vec<u8> {
        build_package(&[
            ("[Content_Types].xml", b"<Types/>".as_slice()),
            ("ppt/slides/slide1.xml", &slide_xml(&["Hello"])),
            ("ppt/slides/slide2.xml", &slide_xml(&[])),
            ("ppt/slides/slide3.xml", &slide_xml(&["World", "Bye"])),
            ("ppt/media/image1.png", b"\x89PNGfake".as_slice()),
        ])
    }

    #[test]
    fn test_extract_flattens_in_order() {
        let input = three_slide_package();
        let slides = extract_package_texts(&input).unwrap();

        // Slide 2 has no qualifying text and is dropped from the plan.
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].path, "ppt/slides/slide1.xml");
        assert_eq!(slides[0].texts, vec!["Hello"]);
        assert_eq!(slides[1].path, "ppt/slides/slide3.xml");
        assert_eq!(slides[1].texts, vec!["World", "Bye"]);

        let total: usize = slides.iter().map(|s| s.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_split_matches_original_counts() {
        let slides = vec![
            SlideTexts::new("ppt/slides/slide1.xml", vec!["Hello".into()]),
            SlideTexts::new("ppt/slides/slide3.xml", vec!["World".into(), "Bye".into()]),
        ];
        let plan = split_translations(
            &slides,
            vec!["HELLO".into(), "WORLD".into(), "BYE".into()],
        );

        assert_eq!(plan[0].texts, vec!["HELLO"]);
        assert_eq!(plan[1].texts, vec!["WORLD", "BYE"]);
    }

    #[test]
    fn test_full_job_translates_and_preserves() {
        let input = three_slide_package();
        let output = translate_package(&input, &uppercase).unwrap();

        let slides = extract_package_texts(&output).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].texts, vec!["HELLO"]);
        assert_eq!(slides[1].texts, vec!["WORLD", "BYE"]);

        // Untouched entries are byte-identical, slide 2 included.
        for path in [
            "[Content_Types].xml",
            "ppt/slides/slide2.xml",
            "ppt/media/image1.png",
        ] {
            assert_eq!(entry_bytes(&output, path), entry_bytes(&input, path));
        }
    }

    #[test]
    fn test_phases_are_reported_in_order() {
        let input = three_slide_package();
        let mut phases = Vec::new();
        translate_package_with_progress(&input, &uppercase, |phase| phases.push(phase)).unwrap();

        assert_eq!(
            phases,
            vec![JobPhase::Processing, JobPhase::Translating, JobPhase::Generating]
        );
    }

    #[test]
    fn test_count_mismatch_aborts_job() {
        let input = three_slide_package();
        let short = |texts: &[String]| -> Result<Vec<String>> {
            Ok(texts[..texts.len() - 1].to_vec())
        };

        let err = translate_package(&input, &short).unwrap_err();
        match err {
            Error::TranslationCountMismatch { expected, actual } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected count mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_package_never_calls_translator() {
        let input = build_package(&[
            ("ppt/slides/slide1.xml", &slide_xml(&["   "])),
            ("ppt/slides/slide2.xml", &slide_xml(&[])),
        ]);

        let called = Cell::new(false);
        let translator = |texts: &[String]| -> Result<Vec<String>> {
            called.set(true);
            Ok(texts.to_vec())
        };

        let err = translate_package(&input, &translator).unwrap_err();
        assert_eq!(err.kind(), "no_translatable_text");
        assert!(!called.get());
    }

    #[test]
    fn test_corrupt_slide_is_isolated() {
        let corrupt = b"<p:sld><p:cSld><a:t>broken".as_slice();
        let input = build_package(&[
            ("ppt/slides/slide1.xml", &slide_xml(&["Hello"])),
            ("ppt/slides/slide2.xml", corrupt),
            ("ppt/slides/slide3.xml", &slide_xml(&["Bye"])),
        ]);

        let output = translate_package(&input, &uppercase).unwrap();

        let slides = extract_package_texts(&output).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].texts, vec!["HELLO"]);
        assert_eq!(slides[1].texts, vec!["BYE"]);

        // The corrupt slide contributes nothing and keeps its bytes.
        assert_eq!(entry_bytes(&output, "ppt/slides/slide2.xml"), corrupt);
    }

    #[test]
    fn test_translator_failure_aborts_job() {
        let input = three_slide_package();
        let failing =
            |_: &[String]| -> Result<Vec<String>> { Err(Error::TranslationFailed("down".into())) };

        let err = translate_package(&input, &failing).unwrap_err();
        assert_eq!(err.kind(), "translation_failed");
    }

    #[test]
    fn test_rebuild_package_validates_counts() {
        let input = three_slide_package();
        let wrong = vec![SlideTexts::new(
            "ppt/slides/slide3.xml",
            vec!["only one".into()],
        )];

        let err = rebuild_package(&input, &wrong).unwrap_err();
        assert_eq!(err.kind(), "translation_count_mismatch");
    }

    #[test]
    fn test_rebuild_package_round_trip() {
        let input = three_slide_package();
        let slides = extract_package_texts(&input).unwrap();
        let translated: Vec<SlideTexts> = slides
            .iter()
            .map(|s| {
                SlideTexts::new(
                    s.path.clone(),
                    s.texts.iter().map(|t| t.to_uppercase()).collect(),
                )
            })
            .collect();

        let output = rebuild_package(&input, &translated).unwrap();
        let result = extract_package_texts(&output).unwrap();
        assert_eq!(result[0].texts, vec!["HELLO"]);
        assert_eq!(result[1].texts, vec!["WORLD", "BYE"]);
    }
}
