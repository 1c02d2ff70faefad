//! Client-side text extraction from PDF bytes
//!
//! Extraction happens strictly locally: the raw bytes never leave the
//! process here. Pages come out in order and are joined with a blank line,
//! giving the scanner one document string to work over.

use crate::document::PdfDocument;
use async_trait::async_trait;
use thiserror::Error;

/// The bytes could not be parsed as a PDF. Terminal for the current
/// attempt; the workflow never retries extraction.
#[derive(Debug, Error)]
#[error("could not read the document as a PDF: {reason}")]
pub struct DocumentFormatError {
    reason: String,
}

impl DocumentFormatError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Seam between the consent workflow and the PDF parsing machinery, so the
/// workflow is testable without real documents.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &PdfDocument) -> Result<String, DocumentFormatError>;
}

/// Extractor backed by `pdf-extract`
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: &PdfDocument) -> Result<String, DocumentFormatError> {
        let file_name = document.file_name().to_string();
        let bytes = document.bytes().to_vec();

        tracing::debug!(
            "[Extractor] Starting extraction: {} ({} bytes)",
            file_name,
            bytes.len()
        );

        // Parsing is CPU-bound and pdf-extract (via its font handling) can
        // panic on malformed glyphs, so run it on a blocking thread behind
        // catch_unwind.
        let pages = tokio::task::spawn_blocking(move || {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
            }))
        })
        .await
        .map_err(|e| DocumentFormatError::new(format!("extraction task failed: {e}")))?;

        let pages = match pages {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                tracing::warn!("[Extractor] Extraction failed for {}: {}", file_name, e);
                return Err(DocumentFormatError::new(e.to_string()));
            }
            Err(_panic) => {
                tracing::error!(
                    "[Extractor] Extraction panicked for {} - likely malformed font/glyph",
                    file_name
                );
                return Err(DocumentFormatError::new(
                    "extraction panicked - the document likely contains malformed fonts",
                ));
            }
        };

        let text = pages.join("\n\n");
        tracing::info!(
            "[Extractor] Extracted {} page(s), {} chars from {}",
            pages.len(),
            text.len(),
            file_name
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unparseable_pdf_maps_to_format_error() {
        // Passes the magic check at intake but has no valid structure
        let doc = PdfDocument::new("roto.pdf", b"%PDF-1.4 garbage".to_vec()).unwrap();
        let err = PdfTextExtractor.extract_text(&doc).await.unwrap_err();
        assert!(err.to_string().contains("could not read the document"));
    }

    #[tokio::test]
    async fn test_extractor_usable_behind_trait_object() {
        let extractor: Box<dyn TextExtractor> = Box::new(PdfTextExtractor);
        let doc = PdfDocument::new("roto.pdf", b"%PDF-1.4".to_vec()).unwrap();
        assert!(extractor.extract_text(&doc).await.is_err());
    }
}
