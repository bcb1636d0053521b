//! Document knowledge loader.
//!
//! Scans a folder for PDF files on every call and concatenates their text,
//! one header line per document. A document that fails to extract is logged
//! and skipped; the rest of the folder is still loaded.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while extracting a single document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The PDF could not be parsed or decoded.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    /// The file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The extractor panicked on malformed input.
    #[error("extractor panicked")]
    Panicked,
}

/// Turns a document file into per-page text.
pub trait DocumentExtractor: Send + Sync {
    /// Whether this extractor handles the file at `path`.
    fn is_supported(&self, path: &Path) -> bool;

    /// Extract the text of every page, in page order.
    ///
    /// # Errors
    /// Returns an error if the document is unreadable or corrupt.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// PDF extractor backed by `lopdf`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let doc = lopdf::Document::load(path)?;
        let mut pages = Vec::new();
        // `get_pages` is keyed by page number, so iteration is already in page order.
        for page_number in doc.get_pages().keys() {
            pages.push(doc.extract_text(&[*page_number])?);
        }
        Ok(pages)
    }
}

/// Text gathered from the document folder.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DocumentKnowledge {
    /// Concatenated document text with a header per document.
    pub text: String,
    /// Number of documents included.
    pub loaded: usize,
    /// Number of documents skipped because extraction failed.
    pub skipped: usize,
}

/// Loads document knowledge from a fixed folder.
#[derive(Clone)]
pub struct DocumentKnowledgeLoader {
    dir: PathBuf,
    extractor: Arc<dyn DocumentExtractor>,
}

impl DocumentKnowledgeLoader {
    /// Create a loader for `dir` using the PDF extractor.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extractor(dir, Arc::new(PdfExtractor))
    }

    /// Create a loader with a custom extractor.
    #[must_use]
    pub fn with_extractor(dir: impl Into<PathBuf>, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self {
            dir: dir.into(),
            extractor,
        }
    }

    /// Scan and extract on the blocking pool.
    ///
    /// Never fails: a missing folder or an unreadable document only reduces
    /// the returned knowledge.
    pub async fn load(&self) -> DocumentKnowledge {
        let loader = self.clone();
        match tokio::task::spawn_blocking(move || loader.load_blocking()).await {
            Ok(knowledge) => knowledge,
            Err(err) => {
                tracing::error!("document loading task failed: {err}");
                DocumentKnowledge::default()
            }
        }
    }

    /// Scan and extract on the current thread.
    #[must_use]
    pub fn load_blocking(&self) -> DocumentKnowledge {
        let mut knowledge = DocumentKnowledge::default();

        if !self.dir.is_dir() {
            if let Err(err) = std::fs::create_dir_all(&self.dir) {
                tracing::warn!("cannot create document folder {}: {err}", self.dir.display());
            }
            return knowledge;
        }

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("cannot read document folder {}: {err}", self.dir.display());
                return knowledge;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !self.extractor.is_supported(&path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();

            let extractor = Arc::clone(&self.extractor);
            let result = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract_pages(&path)))
                .unwrap_or(Err(ExtractionError::Panicked));

            match result {
                Ok(pages) => {
                    knowledge.text.push_str("\n--- Dokument: ");
                    knowledge.text.push_str(&name);
                    knowledge.text.push_str(" ---\n");
                    for page in pages {
                        knowledge.text.push_str(&page);
                        knowledge.text.push('\n');
                    }
                    knowledge.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(document = %name, "skipping unreadable document: {err}");
                    knowledge.skipped += 1;
                }
            }
        }

        tracing::debug!(
            loaded = knowledge.loaded,
            skipped = knowledge.skipped,
            "document knowledge loaded"
        );
        knowledge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Treats `.pdf` files starting with `OK` as valid; pages split on form feed.
    struct FakeExtractor;

    impl DocumentExtractor for FakeExtractor {
        fn is_supported(&self, path: &Path) -> bool {
            PdfExtractor.is_supported(path)
        }

        fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
            let raw = std::fs::read_to_string(path)?;
            match raw.strip_prefix("OK") {
                Some(body) => Ok(body.split('\x0c').map(str::to_string).collect()),
                None => Err(ExtractionError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "corrupt document",
                ))),
            }
        }
    }

    fn fake_loader(dir: &Path) -> DocumentKnowledgeLoader {
        DocumentKnowledgeLoader::with_extractor(dir, Arc::new(FakeExtractor))
    }

    #[test]
    fn test_missing_folder_yields_empty_and_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("docs");

        let knowledge = fake_loader(&dir).load_blocking();
        assert!(knowledge.text.is_empty());
        assert_eq!(knowledge.loaded, 0);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_corrupt_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cenovnik.pdf"), "OKstrana jedan\x0cstrana dva").unwrap();
        std::fs::write(dir.path().join("pokvaren.pdf"), "garbage").unwrap();
        std::fs::write(dir.path().join("beleske.txt"), "OKignored").unwrap();

        let knowledge = fake_loader(dir.path()).load_blocking();
        assert_eq!(knowledge.loaded, 1);
        assert_eq!(knowledge.skipped, 1);
        assert!(knowledge.text.contains("--- Dokument: cenovnik.pdf ---"));
        assert!(knowledge.text.contains("strana jedan\nstrana dva\n"));
        assert!(!knowledge.text.contains("pokvaren.pdf"));
        assert!(!knowledge.text.contains("ignored"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(PdfExtractor.is_supported(Path::new("a/Ponuda.PDF")));
        assert!(!PdfExtractor.is_supported(Path::new("a/ponuda.docx")));
        assert!(!PdfExtractor.is_supported(Path::new("a/pdf")));
    }

    #[test]
    fn test_pdf_extractor_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(PdfExtractor.extract_pages(&path).is_err());

        let knowledge = DocumentKnowledgeLoader::new(dir.path()).load_blocking();
        assert_eq!(knowledge.skipped, 1);
        assert!(knowledge.text.is_empty());
    }

    #[test]
    fn test_pdf_extractor_reads_generated_document() {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello agency")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let dir = tempfile::tempdir().unwrap();
        doc.save(dir.path().join("ponuda.pdf")).unwrap();
        std::fs::write(dir.path().join("pokvaren.pdf"), b"this is not a pdf").unwrap();

        let knowledge = DocumentKnowledgeLoader::new(dir.path()).load_blocking();
        assert_eq!(knowledge.loaded, 1);
        assert_eq!(knowledge.skipped, 1);
        assert!(knowledge.text.contains("--- Dokument: ponuda.pdf ---"));
        assert!(knowledge.text.contains("Hello agency"));
    }
}
