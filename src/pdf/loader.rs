use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::PdfError;
use crate::document::Document;

/// Loads a PDF from disk as one [`Document`] per page.
///
/// Page documents carry `source` (the file path) and `page` (0-based index)
/// metadata.
#[derive(Debug, Clone)]
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Document>, PdfError> {
        let doc = lopdf::Document::load(&self.path).map_err(|source| PdfError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let source = self.path.to_string_lossy().into_owned();
        let pages: Vec<Document> = doc
            .get_pages()
            .keys()
            .enumerate()
            .map(|(index, &page_number)| {
                let text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                    warn!(path = %source, page = page_number, error = %e, "no extractable text on page");
                    String::new()
                });
                Document::new(text)
                    .with_metadata("source", source.clone())
                    .with_metadata("page", index)
            })
            .collect();

        debug!(path = %source, pages = pages.len(), "pdf loaded");
        Ok(pages)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_one_document_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.pdf");
        fixture::write_pdf(&path, &["Pasta", "Risotto", "Tiramisu"]);

        let pages = PdfLoader::new(&path).load().unwrap();

        assert_eq!(pages.len(), 3);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.metadata["page"], i);
            assert_eq!(page.metadata["source"], path.to_string_lossy().as_ref());
        }
    }

    #[test]
    fn invalid_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, PdfError::Parse { .. }), "got: {err:?}");
    }
}
