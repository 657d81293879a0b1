//! dir-diary - LLM client for project file classification and code summaries.
//!
//! Sends prompts to an OpenAI-compatible chat-completion API, retries once
//! on a long-context fallback model when the prompt overflows the context
//! window, validates structured classification output, and keeps a running
//! cost total per client.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;

pub use error::{ClassificationError, DiaryError, ExitCode, Result};
