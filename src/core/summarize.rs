//! Free-text summaries of source files.

use super::client::LlmClient;
use super::cost::QueryRecord;
use super::models::SummaryKind;
use super::prompts::summary_prompt;
use crate::error::{DiaryError, Result};

/// A generated summary plus the cost of producing it.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub kind: SummaryKind,
    pub text: String,
    pub record: QueryRecord,
    pub total_cost_usd: f64,
}

/// Summarize `code` using the template for `kind`.
///
/// # Errors
///
/// Transport and cost errors from [`LlmClient::query`], or
/// [`DiaryError::MissingContent`] if the model returned no text.
pub async fn summarize_code(
    client: &LlmClient,
    code: &str,
    kind: SummaryKind,
) -> Result<SummaryOutcome> {
    let prompt = summary_prompt(kind, code);
    let outcome = client.query(&prompt, None).await?;
    let text = outcome
        .response
        .content()
        .ok_or(DiaryError::MissingContent)?
        .trim()
        .to_string();

    tracing::debug!(%kind, chars = text.len(), "Summary generated");

    Ok(SummaryOutcome {
        kind,
        text,
        record: outcome.record,
        total_cost_usd: outcome.total_cost_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::{text_response, ScriptedBackend};
    use crate::core::prompts::{pseudocode_prompt, usage_prompt};

    const CODE: &str = "def add(a, b):\n    return a + b\n";

    #[tokio::test]
    async fn pseudocode_uses_pseudocode_template() {
        let backend = ScriptedBackend::new(vec![Ok(text_response(
            "  FUNCTION add(a, b): RETURN a + b\n",
            50,
            12,
        ))]);
        let requests = backend.requests.clone();
        let client = LlmClient::new(backend, "gpt-3.5-turbo");

        let summary = summarize_code(&client, CODE, SummaryKind::Pseudocode)
            .await
            .unwrap();

        assert_eq!(summary.text, "FUNCTION add(a, b): RETURN a + b");
        let sent = requests.lock().unwrap();
        assert_eq!(sent[0].messages[0].content, pseudocode_prompt(CODE));
        assert!(sent[0].tools.is_none());
    }

    #[tokio::test]
    async fn usage_uses_usage_template() {
        let backend = ScriptedBackend::new(vec![Ok(text_response("Call add(1, 2).", 50, 8))]);
        let requests = backend.requests.clone();
        let client = LlmClient::new(backend, "gpt-3.5-turbo");

        let summary = summarize_code(&client, CODE, SummaryKind::Usage).await.unwrap();

        assert_eq!(summary.kind, SummaryKind::Usage);
        assert_eq!(requests.lock().unwrap()[0].messages[0].content, usage_prompt(CODE));
        assert_eq!(summary.record.completion_tokens, 8);
    }

    #[tokio::test]
    async fn empty_content_is_missing() {
        let backend = ScriptedBackend::new(vec![Ok(text_response("   ", 50, 0))]);
        let client = LlmClient::new(backend, "gpt-3.5-turbo");

        let err = summarize_code(&client, CODE, SummaryKind::Usage)
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::MissingContent));
        // Cost is still accounted: the provider billed the request.
        assert_eq!(client.costs().query_count(), 1);
    }
}
