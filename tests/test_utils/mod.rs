//! Test utilities for integration tests
use std::path::Path;

use orchat::chat::ChatController;
use orchat::cli::chat::controller;
use orchat::core::AppConfig;

pub const TEST_KEY: &str = "sk-or-v1-abc123";
pub const TEST_MODEL: &str = "openai/gpt-4o-mini";

pub fn test_config(storage_path: &Path, api_hostname: &str) -> AppConfig {
    AppConfig {
        storage_path: storage_path.display().to_string(),
        api_hostname: api_hostname.to_string(),
        models: vec![TEST_MODEL.to_string(), String::from("openrouter/auto")],
        default_model: None,
        referer: String::from("http://localhost"),
        title: String::from("Simple AI Chat"),
    }
}

/// Creates a controller that stores its key in `storage_path` and talks
/// to the endpoint at `api_hostname`, usually a `mockito` server.
pub fn test_controller(storage_path: &Path, api_hostname: &str) -> ChatController {
    controller(&test_config(storage_path, api_hostname), None).unwrap()
}

/// Same as `test_controller` but with `TEST_KEY` already saved.
pub fn active_controller(storage_path: &Path, api_hostname: &str) -> ChatController {
    let mut chat = test_controller(storage_path, api_hostname);
    chat.save_credential(TEST_KEY).unwrap();
    chat
}

pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "gen-123",
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
