// Integration tests for logging functionality
// Note: these tests initialize the global subscriber, so this file holds a single test

mod common;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use common::{chat_service, memory_config, ScriptedModel};
use docchat::domain::models::LoggingConfig;
use docchat::infrastructure::logging::LoggerImpl;

#[test]
fn test_chat_turn_logs_to_file_without_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        level: "info".to_string(),
        format: "json".to_string(),
        log_dir: Some(temp_dir.path().to_path_buf()),
        file_name: "docchat.log".to_string(),
        rotation: "never".to_string(),
    };

    let logger = temp_env::with_var_unset("RUST_LOG", || LoggerImpl::init(&config)).unwrap();

    let model = Arc::new(ScriptedModel::default());
    model.push_error("invalid credentials for Bearer sk-or-v1-abcdef0123456789abcdef");
    let chat = chat_service(memory_config(), model);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let reply = runtime.block_on(chat.turn("s1", "hello", false));
    assert!(reply.is_error());

    // Dropping the guard flushes the non-blocking writer
    drop(logger);

    let contents = fs::read_to_string(temp_dir.path().join("docchat.log")).unwrap();
    assert!(contents.contains("logger initialized"));
    assert!(contents.contains("chat turn failed"));
    assert!(contents.contains("session_id"));
    assert!(!contents.contains("abcdef0123456789abcdef"));
}
