//! Chat-completion wire types and the backend seam.
//!
//! [`ChatBackend`] is the single outbound operation: send one chat-completion
//! request, get back the parsed response or a classified error. The client in
//! [`super::client`] layers fallback and cost accounting on top of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Role of a sent message. Every request is a single user turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A message sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// A user-role message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A function the model may be asked to call, described by a JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool definition as sent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionSchema,
}

impl From<FunctionSchema> for ToolDefinition {
    fn from(function: FunctionSchema) -> Self {
        Self {
            tool_type: "function".to_string(),
            function,
        }
    }
}

/// Forces the model to call one named function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolChoice {
    #[serde(rename = "type")]
    pub choice_type: String,
    pub function: ToolChoiceFunction,
}

/// Name of the forced function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolChoiceFunction {
    pub name: String,
}

impl ToolChoice {
    /// Require a call to `name`.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            choice_type: "function".to_string(),
            function: ToolChoiceFunction { name: name.into() },
        }
    }
}

/// One chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

impl ChatRequest {
    /// A single user message, optionally forcing a structured function call.
    #[must_use]
    pub fn single_prompt(
        model: impl Into<String>,
        prompt: impl Into<String>,
        function: Option<&FunctionSchema>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            tools: function.map(|f| vec![ToolDefinition::from(f.clone())]),
            tool_choice: function.map(|f| ToolChoice::function(&f.name)),
            max_tokens: None,
        }
    }

    /// The same request addressed to another model.
    #[must_use]
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    /// Cap the completion length.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Usage with `total_tokens` kept consistent.
    #[must_use]
    pub const fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Function call details. `arguments` is a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Assistant message in a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Legacy single function call field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

/// A choice in the response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Raw chat-completion response, handed back to callers for interpretation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Message of the first choice.
    #[must_use]
    pub fn first_message(&self) -> Option<&ResponseMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Text content of the first choice, if non-empty.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.first_message()
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Function call of the first choice: the first tool call, or the legacy field.
    #[must_use]
    pub fn function_call(&self) -> Option<&FunctionCall> {
        let message = self.first_message()?;
        message
            .tool_calls
            .as_ref()
            .and_then(|calls| calls.first())
            .map(|call| &call.function)
            .or(message.function_call.as_ref())
    }
}

/// Transport for chat-completion requests.
///
/// Implementations classify provider failures into [`crate::error::DiaryError`]
/// variants; in particular a context-window overflow must surface as
/// `ContextLengthExceeded` so the client can fall back.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
