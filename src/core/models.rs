//! Data models for project maps, file classifications, and summaries.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

// =============================================================================
// File roles
// =============================================================================

/// The role a file plays in a software project.
///
/// Closed set: a classification never carries anything outside these nine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FileRole {
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "configuration")]
    Configuration,
    #[serde(
        rename = "build or deployment",
        alias = "build-or-deployment",
        alias = "build_or_deployment"
    )]
    BuildOrDeployment,
    #[serde(rename = "documentation")]
    Documentation,
    #[serde(rename = "testing")]
    Testing,
    #[serde(rename = "database")]
    Database,
    #[serde(
        rename = "utility scripts",
        alias = "utility-scripts",
        alias = "utility_scripts"
    )]
    UtilityScripts,
    #[serde(
        rename = "assets and data",
        alias = "assets-and-data",
        alias = "assets_and_data"
    )]
    AssetsAndData,
    #[serde(rename = "specialized")]
    Specialized,
}

impl FileRole {
    /// Every role, in prompt order.
    pub const ALL: [Self; 9] = [
        Self::Source,
        Self::Configuration,
        Self::BuildOrDeployment,
        Self::Documentation,
        Self::Testing,
        Self::Database,
        Self::UtilityScripts,
        Self::AssetsAndData,
        Self::Specialized,
    ];

    /// Wire name, as used in prompts and function arguments.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Configuration => "configuration",
            Self::BuildOrDeployment => "build or deployment",
            Self::Documentation => "documentation",
            Self::Testing => "testing",
            Self::Database => "database",
            Self::UtilityScripts => "utility scripts",
            Self::AssetsAndData => "assets and data",
            Self::Specialized => "specialized",
        }
    }

    /// Parse a role name leniently.
    ///
    /// Case, surrounding whitespace, and `-`/`_` separators are ignored.
    /// `none`, `null`, and empty strings are not roles and return `None`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileRole {
    type Err = DiaryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_lenient(s).ok_or_else(|| {
            let valid = Self::ALL.map(|r| r.as_str()).join(", ");
            DiaryError::Config(format!("Invalid role '{s}'. Valid roles: {valid}"))
        })
    }
}

/// Whether a raw role string is one of the "no role yet" markers.
#[must_use]
pub fn is_null_role(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "" | "none" | "null")
}

// =============================================================================
// Classification result
// =============================================================================

/// One classified file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileClassification {
    /// Path of the file relative to the project root.
    pub path: String,
    /// Role the file plays in the project.
    pub role: FileRole,
}

/// Classification of every file in a project map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileClassificationList {
    /// Classified files, one entry per path.
    pub files: Vec<FileClassification>,
}

impl FileClassificationList {
    /// Role assigned to a path, if present.
    #[must_use]
    pub fn role_of(&self, path: &str) -> Option<FileRole> {
        self.files.iter().find(|f| f.path == path).map(|f| f.role)
    }

    /// Number of classified files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// =============================================================================
// Project map input
// =============================================================================

/// A file in the caller's project map, possibly already classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMapEntry {
    pub path: String,
    #[serde(default)]
    pub role: Option<FileRole>,
}

impl ProjectMapEntry {
    /// An entry with no role yet.
    #[must_use]
    pub fn unclassified(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role: None,
        }
    }

    /// An entry carrying a prior role as context.
    #[must_use]
    pub fn classified(path: impl Into<String>, role: FileRole) -> Self {
        Self {
            path: path.into(),
            role: Some(role),
        }
    }
}

/// The file structure of a project, as sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectMap {
    pub entries: Vec<ProjectMapEntry>,
}

/// Raw entry as found in a JSON map file; roles may be "none"/"null" strings.
#[derive(Deserialize)]
struct RawMapEntry {
    path: String,
    #[serde(default)]
    role: Option<String>,
}

impl ProjectMap {
    /// Build a map from entries.
    #[must_use]
    pub const fn new(entries: Vec<ProjectMapEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of `{path, role}` objects.
    ///
    /// `null`, `"none"`, and `"null"` roles mean "not classified yet".
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or an unrecognized role string.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: Vec<RawMapEntry> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|entry| {
                let role = match entry.role.as_deref() {
                    None => None,
                    Some(r) if is_null_role(r) => None,
                    Some(r) => Some(r.parse()?),
                };
                Ok(ProjectMapEntry {
                    path: entry.path,
                    role,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Parse a plain listing: one path per line, optionally `path<TAB>role`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on an unrecognized role string.
    pub fn from_listing(content: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim_end();
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (path, role) = match line.split_once('\t') {
                Some((path, role)) if !is_null_role(role) => (path, Some(role.parse()?)),
                Some((path, _)) => (path, None),
                None => (line, None),
            };
            entries.push(ProjectMapEntry {
                path: path.trim().to_string(),
                role,
            });
        }
        Ok(Self { entries })
    }

    /// Parse either format, choosing JSON when the content starts with `[`.
    ///
    /// # Errors
    ///
    /// Propagates the parse error of the chosen format.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim_start().starts_with('[') {
            Self::from_json(content)
        } else {
            Self::from_listing(content)
        }
    }

    /// Render the map as the JSON text inserted into the classification prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Which kind of summary to generate for a code module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    /// Abbreviated natural-language pseudocode.
    Pseudocode,
    /// Instructions on how to use the code.
    Usage,
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pseudocode => f.write_str("pseudocode"),
            Self::Usage => f.write_str("usage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_round_trip_through_serde() {
        for role in FileRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let back: FileRole = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn role_accepts_hyphenated_aliases() {
        let role: FileRole = serde_json::from_str("\"build-or-deployment\"").unwrap();
        assert_eq!(role, FileRole::BuildOrDeployment);
        let role: FileRole = serde_json::from_str("\"assets_and_data\"").unwrap();
        assert_eq!(role, FileRole::AssetsAndData);
    }

    #[test]
    fn lenient_parse_normalizes_case_and_separators() {
        assert_eq!(
            FileRole::parse_lenient("  Utility-Scripts "),
            Some(FileRole::UtilityScripts)
        );
        assert_eq!(
            FileRole::parse_lenient("BUILD_OR_DEPLOYMENT"),
            Some(FileRole::BuildOrDeployment)
        );
        assert_eq!(FileRole::parse_lenient("none"), None);
        assert_eq!(FileRole::parse_lenient("null"), None);
        assert_eq!(FileRole::parse_lenient("frontend"), None);
    }

    #[test]
    fn from_str_lists_valid_roles_on_error() {
        let err = "frontend".parse::<FileRole>().unwrap_err().to_string();
        assert!(err.contains("frontend"));
        assert!(err.contains("utility scripts"));
    }

    #[test]
    fn null_role_markers() {
        assert!(is_null_role("None"));
        assert!(is_null_role(" null "));
        assert!(is_null_role(""));
        assert!(!is_null_role("source"));
    }

    #[test]
    fn project_map_from_json_treats_none_strings_as_unclassified() {
        let map = ProjectMap::from_json(
            r#"[
                {"path": "src/main.py", "role": "source"},
                {"path": "README.md", "role": "None"},
                {"path": "Dockerfile", "role": null},
                {"path": "setup.cfg"}
            ]"#,
        )
        .unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map.entries[0].role, Some(FileRole::Source));
        assert!(map.entries[1..].iter().all(|e| e.role.is_none()));
    }

    #[test]
    fn project_map_from_json_rejects_unknown_roles() {
        let result = ProjectMap::from_json(r#"[{"path": "a.rs", "role": "frontend"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn project_map_from_listing() {
        let map = ProjectMap::from_listing(
            "# project files\nsrc/lib.rs\tsource\n\ntests/test_app.py\nMakefile\tnull\n",
        )
        .unwrap();

        assert_eq!(
            map.entries,
            vec![
                ProjectMapEntry::classified("src/lib.rs", FileRole::Source),
                ProjectMapEntry::unclassified("tests/test_app.py"),
                ProjectMapEntry::unclassified("Makefile"),
            ]
        );
    }

    #[test]
    fn parse_picks_format_by_content() {
        let json = ProjectMap::parse("  [{\"path\": \"a\"}]").unwrap();
        let listing = ProjectMap::parse("a\nb\n").unwrap();
        assert_eq!(json.len(), 1);
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn render_emits_null_for_unclassified() {
        let map = ProjectMap::new(vec![
            ProjectMapEntry::classified("docs/index.md", FileRole::Documentation),
            ProjectMapEntry::unclassified("app.py"),
        ]);
        let rendered = map.render().unwrap();
        assert!(rendered.contains("\"documentation\""));
        assert!(rendered.contains("\"role\": null"));
    }

    #[test]
    fn classification_list_lookup() {
        let list = FileClassificationList {
            files: vec![FileClassification {
                path: "schema.sql".to_string(),
                role: FileRole::Database,
            }],
        };
        assert_eq!(list.role_of("schema.sql"), Some(FileRole::Database));
        assert_eq!(list.role_of("other"), None);
    }
}
