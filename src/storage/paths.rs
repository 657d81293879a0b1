//! Application paths.

use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application paths.
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    /// Platform paths for dir-diary.
    #[must_use]
    pub fn new() -> Self {
        ProjectDirs::from("", "", "dir_diary").map_or_else(
            || {
                // No home directory (e.g. minimal containers): fall back to cwd.
                let home = directories::BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
                Self {
                    config: home.join(".config").join("dir_diary"),
                }
            },
            |dirs| Self {
                config: dirs.config_dir().to_path_buf(),
            },
        )
    }

    /// Path to the TOML config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE_NAME)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
