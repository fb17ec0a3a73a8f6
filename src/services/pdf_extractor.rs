use std::time::Duration;

use lopdf::Document;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentParseError {
    #[error("not a readable PDF: {0}")]
    Malformed(String),
    #[error("PDF extraction timed out after {0:?}")]
    TimedOut(Duration),
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Turns uploaded PDF bytes into plain text, one page after another.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    timeout: Duration,
}

impl PdfTextExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Text of every page in page order. A page whose content cannot be decoded
    /// yields an empty string instead of failing the whole document.
    pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentParseError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| DocumentParseError::Malformed(e.to_string()))?;

        // BTreeMap keyed by page number, so iteration is already in page order.
        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::warn!(page_number, error = %e, "Page text extraction failed");
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }

    /// Concatenation of all page texts with nothing inserted between pages.
    pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentParseError> {
        Ok(Self::extract_pages(bytes)?.concat())
    }

    /// Runs extraction on the blocking pool, bounded by the configured timeout.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<String, DocumentParseError> {
        let text = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_text(&bytes)),
        )
        .await
        .map_err(|_| DocumentParseError::TimedOut(self.timeout))?
        .map_err(|e| DocumentParseError::Task(e.to_string()))??;

        tracing::info!(chars = text.chars().count(), "PDF text extraction complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = PdfTextExtractor::extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentParseError::Malformed(_)));
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(PdfTextExtractor::extract_text(&[]).is_err());
    }

    #[tokio::test]
    async fn async_extract_propagates_parse_errors() {
        let extractor = PdfTextExtractor::new(Duration::from_secs(5));
        let err = extractor.extract(b"plain text upload".to_vec()).await.unwrap_err();
        assert!(matches!(err, DocumentParseError::Malformed(_)));
    }
}
