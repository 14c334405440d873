//! Configuration types for ktscan.

use crate::issue::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for ktscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "default", "all").
    #[serde(default)]
    pub preset: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-listener configurations, keyed by listener id.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a listener is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .get(rule_id)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_id: &str) -> Option<Severity> {
        self.rules.get(rule_id).and_then(|c| c.severity)
    }

    /// Parameter bag for a listener, empty if none is configured.
    #[must_use]
    pub fn rule_config(&self, rule_id: &str) -> RuleConfig {
        self.rules.get(rule_id).cloned().unwrap_or_default()
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of files analyzed in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Run-level timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl AnalyzerConfig {
    /// Run-level timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/build/**".to_string(), "**/.gradle/**".to_string()],
            parallelism: None,
            timeout_secs: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Per-listener configuration.
///
/// Apart from `enabled` and `severity`, the options are opaque to the
/// analyzer; each listener reads the keys it understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this listener is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule's issue.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Listener-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.parallelism.is_none());
        assert!(config.analyzer.timeout().is_none());
        assert!(config.rules.is_empty());
        assert!(config.is_rule_enabled("anything"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./src"
parallelism = 2
timeout_secs = 30

[rules.ComplexMethod]
severity = "defect"
threshold = 15

[rules.UnnecessaryParentheses]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert_eq!(config.analyzer.timeout(), Some(Duration::from_secs(30)));
        assert!(!config.is_rule_enabled("UnnecessaryParentheses"));
        assert_eq!(config.rule_severity("ComplexMethod"), Some(Severity::Defect));

        let bag = config.rule_config("ComplexMethod");
        assert_eq!(bag.get_int("threshold", 10), 15);
        assert_eq!(bag.get_option::<i64>("threshold"), Some(15));
        assert_eq!(config.rule_config("Missing").get_int("threshold", 10), 10);
    }

    #[test]
    fn test_rule_options_are_opaque() {
        let config = Config::parse(
            r#"
[rules.Custom]
strict = true
style = "compact"
limits = [1, 2]
"#,
        )
        .expect("Failed to parse");

        let bag = config.rule_config("Custom");
        assert!(bag.enabled.is_none());
        assert!(bag.get_bool("strict", false));
        assert!(!bag.get_bool("missing", false));
        assert_eq!(bag.get_str("style", "plain"), "compact");
        assert_eq!(bag.get_str("strict", "plain"), "plain");
        assert_eq!(bag.get_option::<Vec<i64>>("limits"), Some(vec![1, 2]));
        assert_eq!(bag.get_int("style", 7), 7);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::parse("analyzer = 3"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
