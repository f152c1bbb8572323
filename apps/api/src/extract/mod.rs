//! Multi-format resume text extraction.
//!
//! Dispatches on the declared media type (substring match) or the filename
//! extension; each format backend is isolated so its parse failures surface
//! as a typed error with the cause attached. Extraction is a pure
//! transformation: no disk, no network, no execution of document-embedded
//! code.

use bytes::Bytes;
use thiserror::Error;

pub mod docx;
pub mod pdf;

/// An uploaded resume document. Transient: exists only for the duration of
/// one extraction call and is never persisted by this module.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub media_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Matches the declared media type by substring, falling back to the
    /// filename extension.
    pub fn detect(media_type: &str, file_name: &str) -> Option<Self> {
        let media = media_type.to_ascii_lowercase();
        let name = file_name.to_ascii_lowercase();

        if media.contains("pdf") || name.ends_with(".pdf") {
            return Some(Self::Pdf);
        }
        if media.contains("word") || media.contains("officedocument") || name.ends_with(".docx") {
            return Some(Self::Docx);
        }
        None
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported resume format. Please upload PDF or DOCX.")]
    Unsupported,

    #[error("Failed to extract text from resume: {0}")]
    Failed(#[source] anyhow::Error),
}

/// Extracts plain text from a resume document, dispatching on format.
pub fn extract(document: &RawDocument) -> Result<String, ExtractError> {
    match DocumentFormat::detect(&document.media_type, &document.file_name) {
        Some(DocumentFormat::Pdf) => pdf::extract_text(&document.bytes),
        Some(DocumentFormat::Docx) => docx::extract_text(&document.bytes),
        None => Err(ExtractError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_pdf_by_media_type() {
        assert_eq!(
            DocumentFormat::detect("application/pdf", "resume"),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_detects_pdf_by_extension() {
        assert_eq!(
            DocumentFormat::detect("application/octet-stream", "Resume.PDF"),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_detects_docx_by_media_type() {
        assert_eq!(
            DocumentFormat::detect(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "resume"
            ),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::detect("application/msword", "resume"),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn test_detects_docx_by_extension() {
        assert_eq!(
            DocumentFormat::detect("", "resume.docx"),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn test_rejects_unknown_formats() {
        assert_eq!(DocumentFormat::detect("text/plain", "resume.txt"), None);
        assert_eq!(DocumentFormat::detect("", "resume"), None);
    }

    #[test]
    fn test_extract_fails_on_unsupported_format() {
        let document = RawDocument {
            bytes: Bytes::from_static(b"hello"),
            media_type: "text/plain".to_string(),
            file_name: "resume.txt".to_string(),
        };
        assert!(matches!(
            extract(&document),
            Err(ExtractError::Unsupported)
        ));
    }
}
