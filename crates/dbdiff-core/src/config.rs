//! Configuration schema (dbdiff.toml)

use serde::{Deserialize, Serialize};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dbdiff.toml";

fn default_extension() -> String {
    "dbd".to_string()
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Extension of definition files picked up from a directory
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Process directory entries sorted by file name
    #[serde(default = "default_true")]
    pub sort_files: bool,

    /// Record parse failures and continue with the next file
    /// instead of aborting the run
    #[serde(default)]
    pub keep_going: bool,

    /// Treat entry comments as significant when comparing
    #[serde(default)]
    pub compare_comments: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            sort_files: true,
            keep_going: false,
            compare_comments: false,
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.extension, "dbd");
        assert!(config.sort_files);
        assert!(!config.keep_going);
        assert!(!config.compare_comments);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml() {
        let config = Config::from_toml("keep_going = true\nextension = \"def\"").unwrap();
        assert!(config.keep_going);
        assert_eq!(config.extension, "def");
        assert!(config.sort_files);
    }

    #[test]
    fn invalid_toml() {
        assert!(matches!(
            Config::from_toml("sort_files = \"yes\""),
            Err(ConfigError::ParseError(_))
        ));
    }
}
