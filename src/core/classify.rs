//! File classification through a forced function call.
//!
//! The model is asked to call `classify_project_files_by_role` with a
//! [`FileClassificationList`]; its arguments are validated against the input
//! project map before anything is returned.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::warn;

use super::backend::{ChatResponse, FunctionSchema};
use super::client::LlmClient;
use super::cost::QueryRecord;
use super::models::{FileClassification, FileClassificationList, FileRole, ProjectMap};
use super::prompts::file_classification_prompt;
use crate::error::{ClassificationError, Result};

/// Name of the function the model must call.
pub const CLASSIFY_FUNCTION_NAME: &str = "classify_project_files_by_role";

const CLASSIFY_FUNCTION_DESCRIPTION: &str =
    "Identify the role that each file plays in a software project";

/// Function schema whose parameters are the JSON schema of [`FileClassificationList`].
///
/// # Errors
///
/// Returns an error if the generated schema cannot be serialized.
pub fn classification_function() -> Result<FunctionSchema> {
    let mut parameters = serde_json::to_value(schemars::schema_for!(FileClassificationList))?;
    if let Some(object) = parameters.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }

    Ok(FunctionSchema {
        name: CLASSIFY_FUNCTION_NAME.to_string(),
        description: CLASSIFY_FUNCTION_DESCRIPTION.to_string(),
        parameters,
    })
}

/// A validated classification plus the cost of producing it.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub classification: FileClassificationList,
    /// `None` when no request was needed (empty map).
    pub record: Option<QueryRecord>,
    pub total_cost_usd: f64,
}

/// Ask the model to assign a role to every file in `map`.
///
/// # Errors
///
/// Transport and cost errors from [`LlmClient::query`]; validation failures
/// as [`crate::error::DiaryError::Classification`].
pub async fn classify_project_files(
    client: &LlmClient,
    map: &ProjectMap,
) -> Result<ClassificationOutcome> {
    if map.is_empty() {
        return Ok(ClassificationOutcome {
            classification: FileClassificationList::default(),
            record: None,
            total_cost_usd: client.total_cost_usd(),
        });
    }

    let function = classification_function()?;
    let prompt = file_classification_prompt(&map.render()?);
    let outcome = client.query(&prompt, Some(&function)).await?;
    let classification = parse_classification(&outcome.response, map)?;

    Ok(ClassificationOutcome {
        classification,
        record: Some(outcome.record),
        total_cost_usd: outcome.total_cost_usd,
    })
}

/// Extract and validate the classification carried by `response`.
///
/// The result lists every path of `map` exactly once, in map order. Paths the
/// model skipped keep their prior role from the map; paths it invented are
/// dropped; repeated paths keep their first role.
///
/// # Errors
///
/// Any [`ClassificationError`]: no function call, wrong function, bad JSON,
/// missing fields, a null or unknown role, or an input path left without a role.
pub fn parse_classification(
    response: &ChatResponse,
    map: &ProjectMap,
) -> std::result::Result<FileClassificationList, ClassificationError> {
    let call = response
        .function_call()
        .ok_or(ClassificationError::MissingFunctionCall)?;
    if call.name != CLASSIFY_FUNCTION_NAME {
        return Err(ClassificationError::UnexpectedFunction {
            expected: CLASSIFY_FUNCTION_NAME.to_string(),
            found: call.name.clone(),
        });
    }

    let arguments: Value = serde_json::from_str(&call.arguments)
        .map_err(|e| ClassificationError::MalformedArguments(e.to_string()))?;
    let files = arguments
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| ClassificationError::MissingField("files".to_string()))?;

    let known: HashSet<&str> = map.entries.iter().map(|e| e.path.as_str()).collect();
    let mut assigned: HashMap<&str, FileRole> = HashMap::new();

    for (index, item) in files.iter().enumerate() {
        let path = item
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ClassificationError::MissingField(format!("files[{index}].path")))?;

        let Some(&path) = known.get(path) else {
            warn!(path, "Model classified a file that is not in the project map, dropping");
            continue;
        };

        let raw_role = item.get("role").and_then(Value::as_str);
        let role = raw_role
            .and_then(FileRole::parse_lenient)
            .ok_or_else(|| ClassificationError::InvalidRole {
                path: path.to_string(),
                role: raw_role.map(str::to_string),
            })?;

        if let Some(existing) = assigned.get(path) {
            if *existing != role {
                warn!(path, kept = %existing, ignored = %role, "Conflicting duplicate classification");
            }
            continue;
        }
        assigned.insert(path, role);
    }

    let mut seen = HashSet::new();
    let mut classified = Vec::with_capacity(map.len());
    for entry in &map.entries {
        if !seen.insert(entry.path.as_str()) {
            continue;
        }
        let role = assigned
            .get(entry.path.as_str())
            .copied()
            .or(entry.role)
            .ok_or_else(|| ClassificationError::MissingPath(entry.path.clone()))?;
        classified.push(FileClassification {
            path: entry.path.clone(),
            role,
        });
    }

    Ok(FileClassificationList { files: classified })
}
