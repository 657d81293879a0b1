//! Human-readable output.
//!
//! Color is applied with `colored`; callers disable it globally through
//! [`set_color_enabled`] so rendering functions stay pure string builders.

use std::fmt::Write as _;

use colored::Colorize;

use super::robot::{ClassifyPayload, CostEstimatePayload, QueryCostPayload, SummaryPayload};
use crate::core::models::FileRole;
use crate::core::pricing::ModelPrice;

/// Turn ANSI styling on or off for everything rendered afterwards.
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}

/// Format a USD amount. Sub-cent amounts keep enough digits to be non-zero.
#[must_use]
pub fn format_usd(amount: f64) -> String {
    if amount.abs() < f64::EPSILON {
        "$0.00".to_string()
    } else if amount.abs() < 0.01 {
        format!("${amount:.6}")
    } else {
        format!("${amount:.4}")
    }
}

/// Format a per-token rate as USD per 1K tokens.
#[must_use]
pub fn format_rate_per_1k(per_token: f64) -> String {
    format!("${:.4}/1K", per_token * 1_000.0)
}

fn role_label(role: FileRole) -> String {
    let label = role.as_str();
    match role {
        FileRole::Source => label.green().to_string(),
        FileRole::Testing => label.cyan().to_string(),
        FileRole::Documentation => label.blue().to_string(),
        FileRole::Configuration | FileRole::BuildOrDeployment => label.yellow().to_string(),
        FileRole::Database | FileRole::AssetsAndData => label.magenta().to_string(),
        FileRole::UtilityScripts | FileRole::Specialized => label.normal().to_string(),
    }
}

fn cost_line(cost: &QueryCostPayload) -> String {
    let mut line = format!(
        "{} {} ({} prompt + {} completion tokens on {})",
        "Cost:".bold(),
        format_usd(cost.cost_usd),
        cost.prompt_tokens,
        cost.completion_tokens,
        cost.model,
    );
    if cost.used_fallback {
        let _ = write!(line, " {}", "[long-context fallback]".yellow());
    }
    let _ = write!(
        line,
        "\n{} {}",
        "Session total:".dimmed(),
        format_usd(cost.total_cost_usd)
    );
    line
}

/// Render a classification as an aligned path/role table.
#[must_use]
pub fn render_classification(payload: &ClassifyPayload) -> String {
    if payload.files.is_empty() {
        return format!("{}\n", "No files to classify.".dimmed());
    }

    let width = payload
        .files
        .iter()
        .map(|f| f.path.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        format!("{:<width$}", "PATH").bold(),
        "ROLE".bold()
    );
    for file in &payload.files {
        let _ = writeln!(out, "{:<width$}  {}", file.path, role_label(file.role));
    }
    if let Some(cost) = &payload.cost {
        out.push('\n');
        out.push_str(&cost_line(cost));
        out.push('\n');
    }
    out
}

/// Render a summary with a header naming the file and summary kind.
#[must_use]
pub fn render_summary(payload: &SummaryPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        format!("{} summary of", payload.kind).bold(),
        payload.file.cyan()
    );
    out.push('\n');
    out.push_str(payload.summary.trim_end());
    out.push_str("\n\n");
    out.push_str(&cost_line(&payload.cost));
    out.push('\n');
    out
}

/// Render an offline cost estimate.
#[must_use]
pub fn render_cost_estimate(payload: &CostEstimatePayload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Model:".bold(), payload.model);
    let _ = writeln!(
        out,
        "  prompt:     {:>8} tokens x {}",
        payload.prompt_tokens,
        format_rate_per_1k(payload.prompt_cost_per_token)
    );
    let _ = writeln!(
        out,
        "  completion: {:>8} tokens x {}",
        payload.completion_tokens,
        format_rate_per_1k(payload.completion_cost_per_token)
    );
    let _ = writeln!(out, "{} {}", "Cost:".bold(), format_usd(payload.cost_usd).green());
    out
}

/// Render the price table.
#[must_use]
pub fn render_models(prices: &[ModelPrice]) -> String {
    let width = prices
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("MODEL".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}  {}",
        format!("{:<width$}", "MODEL").bold(),
        format!("{:>12}", "PROMPT").bold(),
        format!("{:>12}", "COMPLETION").bold()
    );
    for price in prices {
        let _ = writeln!(
            out,
            "{:<width$}  {:>12}  {:>12}",
            price.name,
            format_rate_per_1k(price.prompt_cost_per_token),
            format_rate_per_1k(price.completion_cost_per_token)
        );
    }
    out
}
