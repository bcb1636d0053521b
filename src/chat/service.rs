//! Chat request orchestration.
//!
//! One request runs strictly in sequence: read the recent window, persist the
//! user turn, gather knowledge, build the prompt, call the model, persist the
//! reply. The window is read before the user turn is written so the new
//! message never appears in its own history.

use std::sync::Arc;

use crate::conversation::message::{ChatMessage, Sender};
use crate::conversation::store::ConversationStore;
use crate::core::errors::{AppError, AppResult};
use crate::core::ids::SessionId;
use crate::knowledge::documents::DocumentKnowledgeLoader;
use crate::knowledge::store::KnowledgeStore;
use crate::llm::gateway::ModelGateway;
use crate::prompt::{PromptParts, SYSTEM_PREAMBLE, build_prompt};

/// Reply shown to the visitor when anything after validation fails.
pub const GENERIC_ERROR_MESSAGE: &str = "Izvini, došlo je do greške u povezivanju sa mojim mozgom.";

/// Reply shown when the message or session id is missing.
pub const VALIDATION_ERROR_MESSAGE: &str = "Nedostaje poruka ili ID sesije.";

/// Chat pipeline over the stores and the model gateway.
#[derive(Clone)]
pub struct ChatService {
    conversations: Arc<dyn ConversationStore>,
    knowledge: Arc<dyn KnowledgeStore>,
    documents: DocumentKnowledgeLoader,
    gateway: Arc<dyn ModelGateway>,
    history_window: usize,
}

impl ChatService {
    /// Create a chat service.
    #[must_use]
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        knowledge: Arc<dyn KnowledgeStore>,
        documents: DocumentKnowledgeLoader,
        gateway: Arc<dyn ModelGateway>,
        history_window: usize,
    ) -> Self {
        Self {
            conversations,
            knowledge,
            documents,
            gateway,
            history_window,
        }
    }

    /// Answer one chat message and return the bot reply.
    ///
    /// # Errors
    /// Returns `AppError::Validation` before any write if the message or
    /// session id is missing. Any later failure is returned as-is; the user
    /// turn stays persisted and no bot turn is written.
    pub async fn respond(
        &self,
        session_id: Option<&str>,
        message: Option<&str>,
    ) -> AppResult<ChatMessage> {
        let session_id = SessionId::from_optional(session_id)
            .ok_or_else(|| AppError::Validation("session_id is required".to_string()))?;
        let message = message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::Validation("message is required".to_string()))?;

        let history = self
            .conversations
            .recent_turns(session_id.clone(), self.history_window)
            .await?;

        self.conversations
            .append(session_id.clone(), Sender::User, message.to_string())
            .await?;

        let services = self.knowledge.list_services().await?;
        let facts = self.knowledge.list_company_info().await?;
        let documents = self.documents.load().await;

        let prompt = build_prompt(&PromptParts {
            system_preamble: SYSTEM_PREAMBLE,
            contact_facts: &facts,
            service_facts: &services,
            document_knowledge: &documents.text,
            history: &history,
            user_message: message,
        });
        tracing::debug!(
            session = %session_id,
            history = history.len(),
            documents = documents.loaded,
            prompt_chars = prompt.len(),
            "prompt assembled"
        );

        let reply = match self.gateway.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(
                    session = %session_id,
                    model = self.gateway.model(),
                    "generation failed: {err}"
                );
                return Err(err.into());
            }
        };

        self.conversations
            .append(session_id, Sender::Bot, reply)
            .await
    }

    /// Every turn of a session, oldest first; empty when the id is absent.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    pub async fn history(&self, session_id: Option<&str>) -> AppResult<Vec<ChatMessage>> {
        match SessionId::from_optional(session_id) {
            Some(session_id) => self.conversations.full_history(session_id).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::conversation::store::SqliteConversationStore;
    use crate::knowledge::store::{CompanyInfo, Service, SqliteKnowledgeStore};
    use crate::llm::gateway::{GatewayError, GenerateFuture};
    use crate::prompt::NO_HISTORY_MARKER;
    use crate::storage::{StoreFuture, open_in_memory};

    /// Gateway that records prompts and replies from a script.
    pub(crate) struct ScriptedGateway {
        pub(crate) prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ScriptedGateway {
        pub(crate) fn replying() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    impl ModelGateway for ScriptedGateway {
        fn model(&self) -> &str {
            "scripted"
        }

        fn generate(&self, prompt: String) -> GenerateFuture<'_> {
            Box::pin(async move {
                let n = {
                    let mut prompts = self.prompts.lock().unwrap();
                    prompts.push(prompt);
                    prompts.len()
                };
                if self.fail {
                    Err(GatewayError::EmptyResponse)
                } else {
                    Ok(format!("odgovor {n}"))
                }
            })
        }
    }

    /// Knowledge store whose reads always fail.
    pub(crate) struct UnavailableKnowledge;

    impl KnowledgeStore for UnavailableKnowledge {
        fn list_services(&self) -> StoreFuture<'_, AppResult<Vec<Service>>> {
            Box::pin(async { Err(AppError::Io(std::io::Error::other("services unavailable"))) })
        }

        fn list_company_info(&self) -> StoreFuture<'_, AppResult<Vec<CompanyInfo>>> {
            Box::pin(async { Err(AppError::Io(std::io::Error::other("facts unavailable"))) })
        }

        fn seed_if_empty(&self) -> StoreFuture<'_, AppResult<bool>> {
            Box::pin(async { Ok(false) })
        }
    }

    pub(crate) async fn service_with(
        gateway: Arc<ScriptedGateway>,
    ) -> (ChatService, Arc<SqliteConversationStore>, tempfile::TempDir) {
        let conn = open_in_memory().await.unwrap();
        let conversations = Arc::new(SqliteConversationStore::new(conn.clone()));
        let knowledge = Arc::new(SqliteKnowledgeStore::new(conn));
        knowledge.seed_if_empty().await.unwrap();
        let docs = tempfile::tempdir().unwrap();
        let service = ChatService::new(
            conversations.clone(),
            knowledge,
            DocumentKnowledgeLoader::new(docs.path()),
            gateway,
            6,
        );
        (service, conversations, docs)
    }

    fn session(raw: &str) -> SessionId {
        SessionId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_first_message_prompt_has_no_history_marker() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, _, _docs) = service_with(gateway.clone()).await;

        let reply = service.respond(Some("s1"), Some("Zdravo")).await.unwrap();
        assert_eq!(reply.content, "odgovor 1");
        assert_eq!(reply.sender, Sender::Bot);

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].contains(NO_HISTORY_MARKER));
        assert!(prompts[0].contains("AI Chatbot za sajt (od 500 EUR)"));
        assert!(prompts[0].contains("- Email: kontakt@ai-agencija.rs"));
    }

    #[tokio::test]
    async fn test_window_excludes_current_message() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, _, _docs) = service_with(gateway.clone()).await;

        service.respond(Some("s1"), Some("prva")).await.unwrap();
        service.respond(Some("s1"), Some("druga")).await.unwrap();

        let prompts = gateway.prompts.lock().unwrap();
        let history_section = prompts[1]
            .split("ISTORIJA RAZGOVORA:")
            .nth(1)
            .and_then(|rest| rest.split("NOVA PORUKA KORISNIKA:").next())
            .unwrap();
        assert!(history_section.contains("Korisnik: prva"));
        assert!(history_section.contains("Ti (Asistent): odgovor 1"));
        assert!(!history_section.contains("druga"));
    }

    #[tokio::test]
    async fn test_window_is_bounded() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, _, _docs) = service_with(gateway.clone()).await;

        for i in 0..5 {
            service.respond(Some("s1"), Some(format!("poruka {i}").as_str())).await.unwrap();
        }

        let prompts = gateway.prompts.lock().unwrap();
        let last = prompts.last().unwrap();
        // Six turns back from the fifth request covers messages 1..=3 and their replies.
        assert!(!last.contains("Korisnik: poruka 0"));
        assert!(last.contains("Korisnik: poruka 1"));
        assert!(last.contains("Korisnik: poruka 3"));
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_user_turn_only() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let (service, conversations, _docs) = service_with(gateway).await;

        let result = service.respond(Some("s1"), Some("hi")).await;
        assert!(matches!(result, Err(AppError::Generation(_))));

        let history = conversations.full_history(session("s1")).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].content, "hi");
    }

    #[tokio::test]
    async fn test_missing_fields_write_nothing() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, conversations, _docs) = service_with(gateway.clone()).await;

        assert!(matches!(
            service.respond(None, Some("hi")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.respond(Some("s1"), Some("   ")).await,
            Err(AppError::Validation(_))
        ));
        assert!(conversations.full_history(session("s1")).await.unwrap().is_empty());
        assert!(gateway.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_without_session_is_empty() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, _, _docs) = service_with(gateway).await;

        service.respond(Some("s1"), Some("hi")).await.unwrap();
        assert!(service.history(None).await.unwrap().is_empty());
        assert_eq!(service.history(Some("s1")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_knowledge_failure_keeps_user_turn_only() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let conversations = Arc::new(SqliteConversationStore::new(open_in_memory().await.unwrap()));
        let docs = tempfile::tempdir().unwrap();
        let service = ChatService::new(
            conversations.clone(),
            Arc::new(UnavailableKnowledge),
            DocumentKnowledgeLoader::new(docs.path()),
            gateway.clone(),
            6,
        );

        let result = service.respond(Some("s1"), Some("cena?")).await;
        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(gateway.prompts.lock().unwrap().is_empty());

        let history = conversations.full_history(session("s1")).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].content, "cena?");
    }

    #[tokio::test]
    async fn test_message_is_stored_as_sent() {
        let gateway = Arc::new(ScriptedGateway::replying());
        let (service, conversations, _docs) = service_with(gateway.clone()).await;

        service.respond(Some("s1"), Some("  hi\n")).await.unwrap();

        let history = conversations.full_history(session("s1")).await.unwrap();
        assert_eq!(history[0].content, "  hi\n");
        assert!(gateway.prompts.lock().unwrap()[0].contains("  hi\n"));
    }
}
