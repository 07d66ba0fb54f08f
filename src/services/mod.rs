//! Core services: chunking, ingestion, retrieval, the agent loop and chat
//! orchestration.

pub mod agent_loop;
pub mod chat_service;
pub mod chunker;
pub mod document_processing;
pub mod retrieval_tool;
pub mod session_store;
pub mod tool_protocol;

#[cfg(test)]
pub(crate) mod testing;

pub use agent_loop::{AgentLoop, AgentOutcome, ROUND_LIMIT_MESSAGE};
pub use chat_service::ChatService;
pub use chunker::Chunker;
pub use document_processing::{DocumentProcessingService, MAX_CHUNKS};
pub use retrieval_tool::{RetrievalTool, SearchLog, NO_RESULTS};
pub use session_store::SessionStore;
pub use tool_protocol::{ParsedCall, ToolCall, ToolName};
