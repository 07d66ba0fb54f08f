//! Chat orchestration: sessions, RAG and plain turns, ingestion, status.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AssistantMessage, ConversationMessage, Document, Metadata, SystemStatus,
};
use crate::domain::ports::{GenerationParams, LanguageModel};
use crate::infrastructure::logging::scrub;
use crate::services::agent_loop::AgentLoop;
use crate::services::document_processing::DocumentProcessingService;
use crate::services::retrieval_tool::SearchLog;
use crate::services::session_store::SessionStore;

/// Entry point for chat turns.
///
/// A turn never returns an error: failures become an assistant message
/// with `error: true` metadata and the session history is left untouched.
pub struct ChatService {
    model: Arc<dyn LanguageModel>,
    agent: AgentLoop,
    ingestion: DocumentProcessingService,
    sessions: SessionStore,
    embedding_model: String,
    params: GenerationParams,
}

impl ChatService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        agent: AgentLoop,
        ingestion: DocumentProcessingService,
        embedding_model: impl Into<String>,
    ) -> Self {
        info!(model = model.model_id(), "ChatService initialized");
        Self {
            model,
            agent,
            ingestion,
            sessions: SessionStore::new(),
            embedding_model: embedding_model.into(),
            params: GenerationParams::default(),
        }
    }

    /// Sampling parameters for plain (non-RAG) turns.
    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Name of the document collection.
    pub fn collection(&self) -> &str {
        self.ingestion.collection()
    }

    async fn respond(
        &self,
        text: &str,
        history: &[ConversationMessage],
        use_rag: bool,
    ) -> DomainResult<(String, Metadata)> {
        if use_rag {
            let outcome = self.agent.run(text, history).await?;
            let metadata = outcome.metadata();
            return Ok((outcome.answer, metadata));
        }

        let mut messages = history.to_vec();
        messages.push(ConversationMessage::user(text));
        let generation = self.model.generate(&messages, self.params).await?;

        let mut metadata = generation.metadata;
        metadata.insert("agentic".to_string(), json!(false));
        metadata.insert("tokens_used".to_string(), json!(generation.tokens_used));
        metadata.insert("finish_reason".to_string(), json!(generation.finish_reason));
        Ok((generation.text, metadata))
    }

    /// Run one user turn on `session_id`.
    #[instrument(skip(self, text))]
    pub async fn turn(&self, session_id: &str, text: &str, use_rag: bool) -> AssistantMessage {
        let handle = self.sessions.get_or_create(session_id).await;
        let mut session = handle.lock().await;
        let history = session.history.clone();

        match self.respond(text, &history, use_rag).await {
            Ok((content, metadata)) => {
                session.record_turn(text, content.clone());
                AssistantMessage::new(content, metadata)
            }
            Err(e) => {
                let message = scrub(&e.to_string());
                error!(error = %message, "chat turn failed");
                let mut metadata = Metadata::new();
                metadata.insert("error".to_string(), json!(true));
                AssistantMessage::new(format!("Error: {message}"), metadata)
            }
        }
    }

    /// Reset the history of `session_id`. Returns false for unknown ids.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id).await
    }

    pub async fn history(&self, session_id: &str) -> Option<Vec<ConversationMessage>> {
        self.sessions.history(session_id).await
    }

    pub async fn ingest(&self, path: &Path) -> DomainResult<Document> {
        self.ingestion.process(path).await
    }

    /// Run the retrieval tool directly and return its rendered output.
    pub async fn search(&self, query: &str) -> (String, SearchLog) {
        let mut log = SearchLog::new();
        let output = self.agent.tool().search(query, &mut log).await;
        (output, log)
    }

    /// Delete the document collection.
    pub async fn reset(&self) -> DomainResult<()> {
        self.ingestion.reset().await
    }

    /// Health report. Failures degrade the status instead of erroring.
    pub async fn status(&self) -> SystemStatus {
        let llm_model = self.model.model_id().to_string();
        match self.ingestion.collection_info().await {
            Ok(info) => SystemStatus::healthy(info, llm_model, self.embedding_model.clone()),
            Err(e) => SystemStatus::degraded(
                scrub(&e.to_string()),
                llm_model,
                self.embedding_model.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::loader::FileDocumentLoader;
    use crate::adapters::vector::InMemoryVectorStore;
    use crate::domain::models::HealthStatus;
    use crate::domain::ports::VectorStore;
    use crate::services::chunker::Chunker;
    use crate::services::retrieval_tool::RetrievalTool;
    use crate::services::testing::{HashEmbedder, ScriptedModel};

    fn service(model: Arc<ScriptedModel>, store: Arc<InMemoryVectorStore>) -> ChatService {
        let embedder = Arc::new(HashEmbedder::default());
        let tool = Arc::new(RetrievalTool::new(embedder.clone(), store.clone(), "docs"));
        let agent = AgentLoop::new(model.clone(), tool);
        let ingestion = DocumentProcessingService::new(
            Arc::new(FileDocumentLoader::new()),
            Chunker::paragraph(500, 0),
            embedder,
            store,
            "docs",
        );
        ChatService::new(model, agent, ingestion, "hash-embedder")
    }

    #[tokio::test]
    async fn test_plain_turns_build_history() {
        let model = Arc::new(ScriptedModel::new(["X is a letter.", "Y too."]));
        let chat = service(model.clone(), Arc::new(InMemoryVectorStore::new()));

        let first = chat.turn("s1", "What is X?", false).await;
        assert_eq!(first.content, "X is a letter.");
        assert_eq!(first.metadata["agentic"], json!(false));
        chat.turn("s1", "And what about Y?", false).await;

        let history = chat.history("s1").await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["What is X?", "X is a letter.", "And what about Y?", "Y too."]
        );

        // The second call saw the first turn plus the new question
        assert_eq!(model.seen.lock().unwrap()[1].len(), 3);
    }

    #[tokio::test]
    async fn test_failed_turn_is_absorbed() {
        let model = Arc::new(ScriptedModel::new(["ok"]));
        model.push_error("Bearer sk-or-v1-0123456789abcdef0123 rejected");
        let chat = service(model, Arc::new(InMemoryVectorStore::new()));

        chat.turn("s1", "hello", false).await;
        let failed = chat.turn("s1", "again", false).await;

        assert!(failed.is_error());
        assert!(failed.content.starts_with("Error: "));
        assert!(!failed.content.contains("0123456789abcdef0123"));
        assert_eq!(chat.history("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_session() {
        let model = Arc::new(ScriptedModel::new(["a", "b"]));
        let chat = service(model, Arc::new(InMemoryVectorStore::new()));

        assert!(!chat.clear_session("s1").await);
        chat.turn("s1", "q", false).await;
        assert!(chat.clear_session("s1").await);
        assert_eq!(chat.history("s1").await, Some(Vec::new()));

        chat.turn("s1", "q2", false).await;
        assert_eq!(chat.history("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_degrades_without_collection() {
        let chat = service(
            Arc::new(ScriptedModel::default()),
            Arc::new(InMemoryVectorStore::new()),
        );
        let status = chat.status().await;
        assert_eq!(status.status, HealthStatus::Degraded);
        assert!(status.error.unwrap().contains("not found"));
        assert_eq!(status.llm_model, "scripted-model");
    }

    #[tokio::test]
    async fn test_status_healthy_with_collection() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .create_collection("docs", 16, crate::domain::models::Distance::Cosine)
            .await
            .unwrap();
        let chat = service(Arc::new(ScriptedModel::default()), store);

        let status = chat.status().await;
        assert!(status.is_healthy());
        assert_eq!(status.vector_db.unwrap().name, "docs");
        assert_eq!(status.embedding_model, "hash-embedder");
    }
}
