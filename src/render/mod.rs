//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::Result;
pub use robot::RobotOutput;

/// Render `data` as a JSON envelope for `command`, or with `human` otherwise.
///
/// The result always ends with a newline.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render<T: Serialize>(
    command: &str,
    data: T,
    format: OutputFormat,
    pretty: bool,
    human: impl FnOnce(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human(&data)),
        OutputFormat::Json => {
            let mut json = robot::render_json(&RobotOutput::new(command, data), pretty)?;
            json.push('\n');
            Ok(json)
        }
    }
}
