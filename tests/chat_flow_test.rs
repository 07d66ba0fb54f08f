//! End-to-end chat flows over the in-memory store with a scripted model.

mod common;

use serde_json::json;
use std::io::Write;
use std::sync::Arc;

use common::{chat_service, memory_config, ScriptedModel};
use docchat::domain::models::Role;
use docchat::services::NO_RESULTS;

const NOTES: &str = "\
# Vector databases

Qdrant stores vectors in collections and searches them by cosine similarity.

# Chunking

Documents are split into chunks before embedding so that retrieval returns focused passages.

# Agents

The agent calls search_documents before it answers any question.
";

fn notes_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    file.write_all(NOTES.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn paragraph_config() -> docchat::Config {
    let mut config = memory_config();
    config.chunking.strategy = docchat::ChunkingStrategy::Paragraph;
    config.chunking.max_chunk_size = 120;
    config.chunking.overlap_size = 0;
    config
}

#[tokio::test]
async fn test_history_grows_and_failed_turn_leaves_it_unchanged() {
    let model = Arc::new(ScriptedModel::new(["X is a letter.", "Y is another letter."]));
    model.push_error("upstream overloaded");
    let chat = chat_service(memory_config(), model.clone());

    let first = chat.turn("s1", "What is X?", false).await;
    assert!(!first.is_error());
    let second = chat.turn("s1", "And what about Y?", false).await;
    assert_eq!(second.content, "Y is another letter.");

    let history = chat.history("s1").await.unwrap();
    let turns: Vec<(Role, &str)> = history
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "What is X?"),
            (Role::Assistant, "X is a letter."),
            (Role::User, "And what about Y?"),
            (Role::Assistant, "Y is another letter."),
        ]
    );

    let failed = chat.turn("s1", "And Z?", false).await;
    assert!(failed.is_error());
    assert!(failed.content.starts_with("Error: "));
    assert_eq!(failed.metadata["error"], json!(true));
    assert_eq!(chat.history("s1").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_clear_session_keeps_id_usable() {
    let model = Arc::new(ScriptedModel::new(["one", "two"]));
    let chat = chat_service(memory_config(), model.clone());

    chat.turn("s1", "first", false).await;
    assert!(chat.clear_session("s1").await);
    assert_eq!(chat.history("s1").await.unwrap().len(), 0);

    chat.turn("s1", "second", false).await;
    let history = chat.history("s1").await.unwrap();
    assert_eq!(history.len(), 2);
    // The cleared turn is not replayed to the model
    assert_eq!(model.last_request().len(), 1);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let model = Arc::new(ScriptedModel::new(["a", "b"]));
    let chat = chat_service(memory_config(), model);

    chat.turn("alice", "hi", false).await;
    chat.turn("bob", "hello", false).await;
    assert_eq!(chat.history("alice").await.unwrap()[0].content, "hi");
    assert_eq!(chat.history("bob").await.unwrap()[0].content, "hello");
    assert!(chat.history("carol").await.is_none());
}

#[tokio::test]
async fn test_ingest_then_rag_turn() {
    let file = notes_file();
    let model = Arc::new(ScriptedModel::new([
        "<search_documents><query>Qdrant cosine similarity</query></search_documents>",
        "Qdrant searches collections by cosine similarity.",
    ]));
    let chat = chat_service(paragraph_config(), model.clone());

    let doc = chat.ingest(file.path()).await.unwrap();
    assert!(doc.num_chunks() >= 2);
    assert_eq!(doc.metadata["file_type"], json!(".md"));

    let reply = chat.turn("s1", "How does Qdrant search?", true).await;
    assert_eq!(reply.content, "Qdrant searches collections by cosine similarity.");
    assert_eq!(reply.metadata["agentic"], json!(true));
    assert_eq!(reply.metadata["rounds"], json!(2));
    assert_eq!(
        reply.metadata["search_results_count"],
        json!(doc.num_chunks().min(5))
    );

    let request = model.last_request();
    assert_eq!(request[0].role, Role::System);
    let tool_result = &request.last().unwrap().content;
    assert!(tool_result.starts_with("Tool result (search_documents):\nSource 1:\n"));
    assert!(tool_result.contains("cosine similarity"));

    let status = chat.status().await;
    assert!(status.is_healthy());
    assert_eq!(status.vector_db.unwrap().vectors_count, doc.num_chunks() as u64);
}

#[tokio::test]
async fn test_decoy_tool_name_gets_identical_output() {
    let file = notes_file();

    let real = Arc::new(ScriptedModel::new([
        "<search_documents><query>chunking</query></search_documents>",
        "done",
    ]));
    let chat = chat_service(paragraph_config(), real.clone());
    chat.ingest(file.path()).await.unwrap();
    chat.turn("s1", "Explain chunking", true).await;

    let decoy = Arc::new(ScriptedModel::new([
        "<tool_name><param1>chunking</param1></tool_name>",
        "done",
    ]));
    let chat = chat_service(paragraph_config(), decoy.clone());
    chat.ingest(file.path()).await.unwrap();
    chat.turn("s1", "Explain chunking", true).await;

    let real_output = real.last_request().last().unwrap().content.clone();
    let decoy_output = decoy.last_request().last().unwrap().content.clone();
    assert_eq!(real_output, decoy_output);
}

#[tokio::test]
async fn test_retrieval_source_blocks_respect_limit() {
    let file = notes_file();

    for (limit, expected) in [(2usize, 2usize), (10, 3)] {
        let mut config = paragraph_config();
        config.agent.search_limit = limit;
        let chat = chat_service(config, Arc::new(ScriptedModel::default()));
        let doc = chat.ingest(file.path()).await.unwrap();
        assert_eq!(doc.num_chunks(), 3);

        let (rendered, log) = chat.search("agents answer questions").await;
        assert_eq!(rendered.matches("Source ").count(), expected);
        assert_eq!(log.len(), expected);
        for i in 1..=expected {
            assert!(rendered.contains(&format!("Source {i}:\n")));
        }
    }
}

#[tokio::test]
async fn test_search_missing_collection_is_readable() {
    let chat = chat_service(memory_config(), Arc::new(ScriptedModel::default()));
    let (rendered, log) = chat.search("anything").await;
    assert!(rendered.starts_with("Error performing search: "));
    assert!(log.is_empty());
    assert_ne!(rendered, NO_RESULTS);
}

#[tokio::test]
async fn test_reset_drops_collection() {
    let file = notes_file();
    let chat = chat_service(paragraph_config(), Arc::new(ScriptedModel::default()));
    chat.ingest(file.path()).await.unwrap();
    assert!(chat.status().await.is_healthy());

    chat.reset().await.unwrap();
    assert!(!chat.status().await.is_healthy());
}

#[test]
fn test_unsupported_file_is_reported() {
    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    let chat = chat_service(memory_config(), Arc::new(ScriptedModel::default()));

    let err = tokio_test::block_on(chat.ingest(file.path())).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to process document"));
    assert!(message.contains("Unsupported file type: .xlsx"));
}
