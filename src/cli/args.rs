//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::models::SummaryKind;

/// dir-diary - classify project files and summarize code with an LLM.
#[derive(Parser, Debug)]
#[command(name = "dir-diary")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Primary model identifier
    #[arg(long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Long-context fallback model ("none" disables the retry)
    #[arg(long, value_name = "MODEL", global = true)]
    pub fallback_model: Option<String>,

    /// JSON price file replacing the built-in table
    #[arg(long, value_name = "PATH", global = true)]
    pub pricing: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign a role to every file in a project map
    Classify(ClassifyArgs),

    /// Summarize a source file as pseudocode or usage notes
    Summarize(SummarizeArgs),

    /// Compute the cost of a query from token counts (offline)
    Cost(CostArgs),

    /// List the price table
    Models,
}

/// Arguments for the `classify` command.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Project map: a JSON array of {path, role} or one path per line
    /// (optionally `path<TAB>role`)
    #[arg(value_name = "MAP")]
    pub map: PathBuf,
}

/// Arguments for the `summarize` command.
#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    /// Source file to summarize
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Kind of summary
    #[arg(long, value_enum, default_value = "pseudocode")]
    pub kind: SummaryKind,
}

/// Arguments for the `cost` command.
#[derive(Parser, Debug)]
pub struct CostArgs {
    /// Prompt token count
    #[arg(long, value_name = "N")]
    pub prompt_tokens: u64,

    /// Completion token count
    #[arg(long, value_name = "N")]
    pub completion_tokens: u64,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_overrides_format() {
        let cli = Cli::try_parse_from(["dir-diary", "--json", "models"]).unwrap();
        assert_eq!(cli.effective_format(), OutputFormat::Json);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dir-diary",
            "summarize",
            "app.py",
            "--kind",
            "usage",
            "--model",
            "gpt-4",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("gpt-4"));
        match cli.command {
            Commands::Summarize(args) => assert_eq!(args.kind, SummaryKind::Usage),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cost_requires_token_counts() {
        assert!(Cli::try_parse_from(["dir-diary", "cost", "--prompt-tokens", "10"]).is_err());
    }
}
