//! Knowledge injected into every prompt: reference tables and document text.

pub mod documents;
pub mod seed;
pub mod store;

pub use documents::{
    DocumentExtractor, DocumentKnowledge, DocumentKnowledgeLoader, ExtractionError, PdfExtractor,
};
pub use store::{CompanyInfo, KnowledgeStore, Service, SqliteKnowledgeStore};
