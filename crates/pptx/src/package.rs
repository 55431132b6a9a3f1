//! In-memory accessor for the PPTX ZIP package.
//!
//! Knows nothing about XML; it hands out entry bytes and writes
//! replacements back. Entries that are never rewritten are copied into
//! the output in raw (still-compressed) form, so they come out
//! bit-identical, original compression and metadata included.

use deck_core::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// A PPTX package opened from bytes.
///
/// Replacements are staged in memory; nothing is serialized until
/// [`finalize`](SlidePackage::finalize).
#[derive(Debug)]
pub struct SlidePackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    replacements: HashMap<String, Vec<u8>>,
}

impl SlidePackage {
    /// Open a package from its raw bytes.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::InvalidPackage(format!("Failed to open ZIP: {}", e)))?;

        Ok(Self {
            archive,
            replacements: HashMap::new(),
        })
    }

    /// Entry paths matching a prefix and extension, in the archive's
    /// natural (index) order.
    ///
    /// The order is deterministic and identical across calls, which is
    /// what keeps extraction and reinsertion aligned.
    pub fn entry_names(&mut self, prefix: &str, extension: &str) -> Vec<String> {
        let mut names = Vec::new();
        for i in 0..self.archive.len() {
            if let Ok(file) = self.archive.by_index_raw(i) {
                let name = file.name();
                if name.starts_with(prefix) && name.ends_with(extension) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Read one entry's content.
    ///
    /// Returns the staged replacement if the entry has been rewritten,
    /// otherwise the original bytes.
    pub fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.replacements.get(path) {
            return Ok(bytes.clone());
        }

        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| Error::EntryNotFound(path.to_string()))?;

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Stage replacement content for one entry.
    ///
    /// No structural change: the entry keeps its position, compression
    /// method, and modification time in the finalized package.
    pub fn write_entry(&mut self, path: &str, bytes: Vec<u8>) {
        self.replacements.insert(path.to_string(), bytes);
    }

    /// Serialize the package to output bytes.
    ///
    /// Entries without a staged replacement are raw-copied without
    /// recompression.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for i in 0..self.archive.len() {
            let file = self
                .archive
                .by_index_raw(i)
                .map_err(|e| Error::InvalidPackage(format!("Failed to read entry {}: {}", i, e)))?;

            match self.replacements.get(file.name()) {
                Some(bytes) => {
                    let name = file.name().to_string();
                    let mut options = FileOptions::default()
                        .compression_method(file.compression())
                        .last_modified_time(file.last_modified());
                    if let Some(mode) = file.unix_mode() {
                        options = options.unix_permissions(mode);
                    }
                    drop(file);

                    writer
                        .start_file(name.as_str(), options)
                        .map_err(|e| Error::InvalidPackage(format!("Failed to write '{}': {}", name, e)))?;
                    writer.write_all(bytes)?;
                }
                None => {
                    writer.raw_copy_file(file).map_err(|e| {
                        Error::InvalidPackage(format!("Failed to copy entry {}: {}", i, e))
                    })?;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::InvalidPackage(format!("Failed to finish package: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::CompressionMethod;

    fn build_zip(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes, method) in entries {
            writer
                .start_file(*name, FileOptions::default().compression_method(*method))
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = SlidePackage::open(b"not a zip".to_vec()).unwrap_err();
        assert_eq!(err.kind(), "invalid_package");
    }

    #[test]
    fn test_entry_names_filters_and_keeps_order() {
        let bytes = build_zip(&[
            ("[Content_Types].xml", b"<t/>", CompressionMethod::Deflated),
            ("ppt/slides/slide2.xml", b"<b/>", CompressionMethod::Deflated),
            ("ppt/slides/_rels/slide2.xml.rels", b"<r/>", CompressionMethod::Deflated),
            ("ppt/slides/slide1.xml", b"<a/>", CompressionMethod::Deflated),
            ("ppt/media/image1.png", b"\x89PNG", CompressionMethod::Stored),
        ]);
        let mut package = SlidePackage::open(bytes).unwrap();
        let names = package.entry_names("ppt/slides/", ".xml");

        // Natural order, not sorted; .rels and non-slide parts excluded.
        assert_eq!(names, vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]);
    }

    #[test]
    fn test_read_entry_missing() {
        let bytes = build_zip(&[("a.xml", b"<a/>", CompressionMethod::Deflated)]);
        let mut package = SlidePackage::open(bytes).unwrap();
        let err = package.read_entry("missing.xml").unwrap_err();
        assert_eq!(err.kind(), "entry_not_found");
    }

    #[test]
    fn test_read_entry_sees_staged_replacement() {
        let bytes = build_zip(&[("a.xml", b"<a/>", CompressionMethod::Deflated)]);
        let mut package = SlidePackage::open(bytes).unwrap();
        assert_eq!(package.read_entry("a.xml").unwrap(), b"<a/>");

        package.write_entry("a.xml", b"<b/>".to_vec());
        assert_eq!(package.read_entry("a.xml").unwrap(), b"<b/>");
    }

    #[test]
    fn test_finalize_replaces_and_passes_through() {
        let bytes = build_zip(&[
            ("keep.xml", b"<keep/>", CompressionMethod::Deflated),
            ("change.xml", b"<old/>", CompressionMethod::Deflated),
            ("raw.bin", b"\x00\x01\x02", CompressionMethod::Stored),
        ]);
        let mut package = SlidePackage::open(bytes).unwrap();
        package.write_entry("change.xml", b"<new/>".to_vec());
        let output = package.finalize().unwrap();

        let mut reopened = SlidePackage::open(output).unwrap();
        assert_eq!(reopened.read_entry("keep.xml").unwrap(), b"<keep/>");
        assert_eq!(reopened.read_entry("change.xml").unwrap(), b"<new/>");
        assert_eq!(reopened.read_entry("raw.bin").unwrap(), b"\x00\x01\x02");
    }

    #[test]
    fn test_finalize_preserves_compression_of_untouched_entries() {
        let bytes = build_zip(&[
            ("stored.bin", b"abc", CompressionMethod::Stored),
            ("deflated.xml", b"<x/>", CompressionMethod::Deflated),
        ]);
        let package = SlidePackage::open(bytes).unwrap();
        let output = package.finalize().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(output)).unwrap();
        assert_eq!(
            archive.by_name("stored.bin").unwrap().compression(),
            CompressionMethod::Stored
        );
        assert_eq!(
            archive.by_name("deflated.xml").unwrap().compression(),
            CompressionMethod::Deflated
        );
    }
}
