//! PDF text extraction
//!
//! Wraps `pdf-extract`: the first N pages of a document are converted to
//! text and joined by a blank line.

use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PAGE_LIMIT: usize = 5;
const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to extract text from PDF: {0}")]
    Extract(String),
    #[error("PDF parser aborted on malformed input")]
    Aborted,
}

/// Splits a PDF into per-page text.
pub trait PageExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfError>;
}

/// [`PageExtractor`] backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtract;

impl PageExtractor for PdfExtract {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfError> {
        // pdf-extract panics on some malformed documents
        catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes)))
            .map_err(|_| PdfError::Aborted)?
            .map_err(|e| PdfError::Extract(e.to_string()))
    }
}

/// Join the first `limit` pages; fewer pages than `limit` is not an error.
pub fn join_first_pages<S: AsRef<str>>(pages: &[S], limit: usize) -> String {
    pages
        .iter()
        .take(limit)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

pub fn pdf_to_text_with(
    extractor: &impl PageExtractor,
    bytes: &[u8],
    limit: usize,
) -> Result<String, PdfError> {
    let pages = extractor.extract_pages(bytes)?;
    debug!(pages = pages.len(), limit, "PDF pages extracted");
    Ok(join_first_pages(&pages, limit))
}

/// Convert the first `limit` pages of a PDF to text.
pub fn pdf_to_text(bytes: &[u8], limit: usize) -> Result<String, PdfError> {
    pdf_to_text_with(&PdfExtract, bytes, limit)
}
