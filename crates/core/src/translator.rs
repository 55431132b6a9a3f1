//! The boundary to the external translation service.

use crate::error::Result;

/// An external batch translator.
///
/// Implementations must return exactly one output string per input
/// string, in the same order. The pipeline validates the length and
/// aborts the job on a mismatch; it never calls the translator with an
/// empty batch.
pub trait Translator {
    /// Translate a batch of texts, preserving order and count.
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>>;
}

/// Plain closures are translators; convenient for tests and for hosts
/// that adapt some other client on the fly.
impl<F> Translator for F
where
    F: Fn(&[String]) -> Result<Vec<String>>,
{
    fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        self(texts)
    }
}
