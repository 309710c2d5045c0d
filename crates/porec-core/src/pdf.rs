//! PDF text extraction using lopdf and pdf-extract.
//!
//! The engine consumes pre-extracted page texts; this module is the thin
//! adapter that produces them from raw PDF bytes.

use lopdf::Document;
use tracing::debug;

use crate::error::PdfError;

type Result<T> = std::result::Result<T, PdfError>;

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from raw bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");

            // pdf_extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    /// Load a PDF from a file path.
    pub fn load_file(&mut self, path: &std::path::Path) -> Result<()> {
        let data =
            std::fs::read(path).map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        self.load(&data)
    }

    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Full document text.
    pub fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text)
    }

    /// Per-page texts, in page order.
    ///
    /// pdf_extract gives one flat string, so pages are approximated by
    /// splitting the line stream evenly across the page count. Good enough
    /// here: the line extractor treats the page sequence as one logical
    /// stream anyway.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        let full_text = self.extract_text()?;
        let page_count = self.page_count() as usize;
        if page_count <= 1 {
            return Ok(vec![full_text]);
        }

        let lines: Vec<&str> = full_text.lines().collect();
        let lines_per_page = lines.len().div_ceil(page_count);
        Ok(lines
            .chunks(lines_per_page.max(1))
            .map(|chunk| chunk.join("\n"))
            .collect())
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
