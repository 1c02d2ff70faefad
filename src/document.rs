//! Document intake
//!
//! Boundary checks run here, before any parsing or network use: the bytes
//! must declare themselves as a PDF and stay under the size cap. Everything
//! downstream can assume a plausibly well-formed document.

use std::path::Path;
use thiserror::Error;

/// Maximum accepted document size (30 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 30 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("file must be a PDF, got {detected}")]
    NotAPdf { detected: String },
    #[error("file too large: {size} bytes (maximum is {max})")]
    TooLarge { size: usize, max: usize },
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// An accepted PDF document, held fully in memory for the session
#[derive(Debug, Clone)]
pub struct PdfDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl PdfDocument {
    /// Accept raw bytes as a PDF document.
    ///
    /// Rejects payloads without the `%PDF-` magic and payloads over
    /// [`MAX_DOCUMENT_BYTES`].
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DocumentError::NotAPdf {
                detected: sniff_mime(&bytes).to_string(),
            });
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                max: MAX_DOCUMENT_BYTES,
            });
        }
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }

    /// Load a document from disk.
    ///
    /// The extension-declared type must be `application/pdf`; the byte-level
    /// checks from [`PdfDocument::new`] still apply afterwards.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime != mime_guess::mime::APPLICATION_PDF {
            return Err(DocumentError::NotAPdf {
                detected: mime.essence_str().to_string(),
            });
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Self::new(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Best-effort content sniffing for rejection messages
fn sniff_mime(data: &[u8]) -> &'static str {
    if data.starts_with(PDF_MAGIC) {
        "application/pdf"
    } else if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        "image/png"
    } else if data.len() >= 3 && data[0..3] == [0xFF, 0xD8, 0xFF] {
        "image/jpeg"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.starts_with(b"PK\x03\x04") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}
