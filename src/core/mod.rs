//! Core client, prompts, parsers and cost accounting.

pub mod backend;
pub mod classify;
pub mod client;
pub mod cost;
pub mod http;
pub mod logging;
pub mod models;
pub mod openai;
pub mod pricing;
pub mod prompts;
pub mod summarize;

pub use backend::{ChatBackend, ChatRequest, ChatResponse, FunctionSchema, TokenUsage};
pub use classify::{
    CLASSIFY_FUNCTION_NAME, ClassificationOutcome, classification_function,
    classify_project_files, parse_classification,
};
pub use client::{LlmClient, QueryOutcome, max_tokens_for_model};
pub use cost::{CostTracker, QueryRecord};
pub use models::{
    FileClassification, FileClassificationList, FileRole, ProjectMap, ProjectMapEntry,
    SummaryKind,
};
pub use openai::OpenAiBackend;
pub use pricing::{ModelPrice, PricingTable};
pub use summarize::{SummaryOutcome, summarize_code};
