//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::ChatService;
use crate::core::config::AppConfig;
use crate::core::errors::AppResult;
use crate::conversation::{ConversationStore, SqliteConversationStore};
use crate::knowledge::{DocumentKnowledgeLoader, KnowledgeStore, SqliteKnowledgeStore};
use crate::llm::{GeminiGateway, ModelGateway};
use crate::shop::{CartStore, Catalog, InMemoryCartSessions};
use crate::storage::open_database;

/// Shared application state.
pub struct AppState {
    /// Chat pipeline.
    pub chat: ChatService,
    /// Cart operations.
    pub cart: CartStore,
    /// Read-only product catalog.
    pub catalog: Arc<Catalog>,
    /// Folder served at `/` and `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Open the database, seed reference data and wire the Gemini gateway.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or seeded, or the HTTP client cannot be built.
    pub async fn new(config: &AppConfig) -> AppResult<Arc<Self>> {
        let conn = open_database(&config.storage).await?;
        let knowledge = Arc::new(SqliteKnowledgeStore::new(conn.clone()));
        knowledge.seed_if_empty().await?;

        let gateway = Arc::new(GeminiGateway::new(&config.gemini)?);
        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; every chat request will fail");
        }

        Ok(Self::assemble(
            Arc::new(SqliteConversationStore::new(conn)),
            knowledge,
            DocumentKnowledgeLoader::new(&config.knowledge.documents_dir),
            gateway,
            config,
        ))
    }

    /// Build state from already-constructed parts.
    #[must_use]
    pub fn assemble(
        conversations: Arc<dyn ConversationStore>,
        knowledge: Arc<dyn KnowledgeStore>,
        documents: DocumentKnowledgeLoader,
        gateway: Arc<dyn ModelGateway>,
        config: &AppConfig,
    ) -> Arc<Self> {
        let catalog = Arc::new(Catalog::agency_default());
        let cart = CartStore::new(
            Arc::clone(&catalog),
            Arc::new(InMemoryCartSessions::from_config(&config.shop)),
        );
        let chat = ChatService::new(
            conversations,
            knowledge,
            documents,
            gateway,
            config.knowledge.history_window,
        );

        Arc::new(Self {
            chat,
            cart,
            catalog,
            static_dir: config.server.static_dir.clone(),
        })
    }
}
