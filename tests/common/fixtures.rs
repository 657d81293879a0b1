//! Response builders and input files for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// A plain-text chat completion.
#[must_use]
pub fn text_completion(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Value {
    json!({
        "id": "chatcmpl-fixture",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-3.5-turbo-0613",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// A completion carrying a `classify_project_files_by_role` tool call.
#[must_use]
pub fn classification_completion(files: &Value, prompt_tokens: u64, completion_tokens: u64) -> Value {
    let arguments = json!({ "files": files }).to_string();
    json!({
        "id": "chatcmpl-fixture",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0613",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_fixture",
                    "type": "function",
                    "function": {
                        "name": "classify_project_files_by_role",
                        "arguments": arguments
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// The error body OpenAI returns when a prompt overflows the context window.
#[must_use]
pub fn context_length_error() -> Value {
    json!({
        "error": {
            "message": "This model's maximum context length is 4097 tokens. However, your messages resulted in 9120 tokens. Please reduce the length of the messages.",
            "type": "invalid_request_error",
            "param": "messages",
            "code": "context_length_exceeded"
        }
    })
}

/// A generic API error body.
#[must_use]
pub fn api_error(message: &str, code: Option<&str>) -> Value {
    json!({
        "error": {
            "message": message,
            "type": "invalid_request_error",
            "param": null,
            "code": code
        }
    })
}

/// A small project map with one pre-classified file.
#[must_use]
pub fn sample_map() -> Value {
    json!([
        {"path": "src/app.py", "role": null},
        {"path": "README.md", "role": "documentation"},
        {"path": "tests/test_app.py", "role": null},
        {"path": "Dockerfile", "role": null}
    ])
}

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture file");
    path
}
