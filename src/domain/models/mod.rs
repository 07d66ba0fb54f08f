pub mod chunking;
pub mod config;
pub mod search;
pub mod session;
pub mod status;

pub use chunking::{
    Chunk, ChunkingConfig, ChunkingStrategy, Document, Fragment, Metadata, ELEMENT_TYPE_KEY,
    TITLE_ELEMENT,
};
pub use config::{
    AgentConfig, Config, EmbeddingsConfig, LlmConfig, LoggingConfig, RetryConfig, VectorDbConfig,
};
pub use search::{CollectionInfo, Distance, SearchFilter, SearchResult};
pub use session::{AssistantMessage, ConversationMessage, Role, Session};
pub use status::{HealthStatus, SystemStatus};
