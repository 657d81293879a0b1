//! Prompt templates.
//!
//! Each template is fixed instructional text with one insertion point for
//! caller content, exposed as a function from that content to the final prompt.

use crate::core::models::SummaryKind;

const FILE_CLASSIFICATION_INSTRUCTIONS: &str = "\
We have mapped the file structure of a project folder for an existing coding \
project. Based solely on the file structure, let's attempt to classify them by \
the role they play in the project. We will label code modules, entry points, \
and endpoints as 'source'; config files, environment files, and dependency \
files as 'configuration'; build files, Docker files, and CI/CD files as 'build \
or deployment'; READMEs, CHANGELOGs, pseudocodes, project maps, licenses, and \
docs as 'documentation'; unit tests as 'testing'; migration, schema, and seed \
files as 'database', utility and action scripts as 'utility scripts', static \
assets like images, CSS, CSV, and JSON files as 'assets and data', and \
anything else that doesn't fit these categories (e.g., compiled distribution \
files) as 'specialized'. Some files may already be classified and included for \
context. They need not be reclassified unless a classification is obviously \
wrong. 'None' or 'null' values, however, should be replaced with the correct \
role.
Here is the map of the project file structure:
";

const PSEUDOCODE_INSTRUCTIONS: &str = "\
Generate an abbreviated natural-language pseudocode summary of the following \
code. Make sure to include function, class, and argument names and to indicate \
where objects are imported from so a reader can understand the execution \
context and usage. Well-formatted pseudocode will separate object and function \
blocks with a blank line and will use hierarchical ordered and unordered lists \
to show execution sequence and logical relationships.
Here is the code to summarize:
";

const USAGE_INSTRUCTIONS: &str = "\
Generate natural-language instructions on how to use the following code. \
Describe what the code is doing, how to create instances or invoke methods of \
defined objects, and how to invoke functions. As much as possible, infer what \
data types are expected by function arguments and class methods, as well as \
what data types are returned. When usage cannot be inferred for types and \
classes imported from outside this module, flag the uncertainties and indicate \
where they are imported from. Well-formatted usage summaries will separate \
instructions for different objects and functions with a blank line.
Here is the code to summarize:
";

/// Prompt asking the model to assign a role to every file in `project_map`.
#[must_use]
pub fn file_classification_prompt(project_map: &str) -> String {
    format!("{FILE_CLASSIFICATION_INSTRUCTIONS}{project_map}")
}

/// Prompt asking for a pseudocode summary of `code`.
#[must_use]
pub fn pseudocode_prompt(code: &str) -> String {
    format!("{PSEUDOCODE_INSTRUCTIONS}{code}")
}

/// Prompt asking for usage instructions for `code`.
#[must_use]
pub fn usage_prompt(code: &str) -> String {
    format!("{USAGE_INSTRUCTIONS}{code}")
}

/// Prompt for the requested summary kind.
#[must_use]
pub fn summary_prompt(kind: SummaryKind, code: &str) -> String {
    match kind {
        SummaryKind::Pseudocode => pseudocode_prompt(code),
        SummaryKind::Usage => usage_prompt(code),
    }
}
