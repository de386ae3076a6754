//! Document text extraction: uploaded PDF bytes to plain syllabus text.
//!
//! ## Why sniff magic bytes first?
//!
//! The upload layer forwards whatever MIME type the client declared, and
//! browsers routinely mislabel files. Checking the `%PDF` header before
//! handing the buffer to the parser turns "mysterious parser crash" into a
//! precise error naming the actual first bytes. The extraction itself runs
//! in `spawn_blocking`: PDF parsing is CPU-bound and would otherwise stall
//! the async executor for large documents.

use crate::error::QuizForgeError;
use tracing::debug;

/// The only declared media type in scope.
pub const PDF_MIME: &str = "application/pdf";

/// Extract UTF-8 text from an uploaded document.
///
/// Pure transform: no side effects, no temp files. Fails with
/// `UnsupportedFormat` for any declared type other than PDF, and with
/// `Extraction` when the bytes cannot be parsed as a PDF or yield no text
/// after trimming whitespace.
pub async fn extract_text(bytes: Vec<u8>, declared_mime: &str) -> Result<String, QuizForgeError> {
    if declared_mime != PDF_MIME {
        return Err(QuizForgeError::UnsupportedFormat {
            mime: declared_mime.to_string(),
        });
    }

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let shown = bytes.iter().take(4).copied().collect::<Vec<u8>>();
        return Err(QuizForgeError::Extraction {
            detail: format!("not a PDF (first bytes: {shown:?})"),
        });
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| QuizForgeError::Internal(format!("extraction task panicked: {e}")))?
        .map_err(|e| QuizForgeError::Extraction {
            detail: e.to_string(),
        })?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(QuizForgeError::Extraction {
            detail: "document contains no extractable text".into(),
        });
    }

    debug!("Extracted {} chars of syllabus text from PDF", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_undeclared_formats() {
        let err = extract_text(b"%PDF-1.7 ...".to_vec(), "application/msword")
            .await
            .unwrap_err();
        match err {
            QuizForgeError::UnsupportedFormat { mime } => {
                assert_eq!(mime, "application/msword");
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_wrong_magic_bytes() {
        let err = extract_text(b"PK\x03\x04zipzip".to_vec(), PDF_MIME)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizForgeError::Extraction { .. }));
    }

    #[tokio::test]
    async fn rejects_truncated_buffer() {
        let err = extract_text(b"%P".to_vec(), PDF_MIME).await.unwrap_err();
        assert!(matches!(err, QuizForgeError::Extraction { .. }));
    }

    #[tokio::test]
    async fn rejects_corrupt_pdf_body() {
        // Valid magic, garbage body. A parser panic is caught by the
        // blocking task and surfaces as Internal, so accept either.
        let err = extract_text(b"%PDF-1.4 this is not a real pdf".to_vec(), PDF_MIME)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizForgeError::Extraction { .. } | QuizForgeError::Internal(_)
        ));
    }
}
