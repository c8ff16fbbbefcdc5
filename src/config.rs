use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::ConfigError,
    interpreter::{
        evaluator::core::{LEFT_DELIMITER, RIGHT_DELIMITER},
        registry::AutoloadDefinition,
    },
};

/// Engine settings, usually read from a TOML file.
///
/// ```toml
/// left_delimiter = "{"
/// right_delimiter = "}"
/// literals = ["literal", "verbatim"]
/// template_root = "templates"
///
/// [[autoload.operators]]
/// function = "text"
/// names = ["upcase", "downcase"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// The left delimiter.
    pub left_delimiter:  String,
    /// The right delimiter.
    pub right_delimiter: String,
    /// Extra literal tag names; `literal` is always one.
    pub literals:        Vec<String>,
    /// Directory the `file` loader reads templates from.
    pub template_root:   Option<PathBuf>,
    /// Lazily loaded handlers.
    pub autoload:        AutoloadConfig,
}

/// The `[autoload]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoloadConfig {
    /// Function tag descriptors.
    pub functions: Vec<AutoloadDefinition>,
    /// Operator descriptors.
    pub operators: Vec<AutoloadDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { left_delimiter:  LEFT_DELIMITER.to_string(),
               right_delimiter: RIGHT_DELIMITER.to_string(),
               literals:        Vec::new(),
               template_root:   None,
               autoload:        AutoloadConfig::default(), }
    }
}

impl EngineConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, or any error of
    /// [`from_toml`](Self::from_toml).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(),
                                                                                       source })?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from TOML text. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    /// [`ConfigError::Toml`] for malformed TOML or unknown keys, and
    /// [`ConfigError::EmptyDelimiter`] if a delimiter is empty.
    ///
    /// # Example
    /// ```
    /// use templar::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_toml("left_delimiter = \"<%\"\nright_delimiter = \"%>\"").unwrap();
    ///
    /// assert_eq!(config.left_delimiter, "<%");
    /// assert!(config.literals.is_empty());
    /// assert!(EngineConfig::from_toml("left_delimiter = \"\"").is_err());
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that TOML parsing cannot, e.g. after command line
    /// overrides.
    ///
    /// # Errors
    /// [`ConfigError::EmptyDelimiter`] if a delimiter is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.left_delimiter.is_empty() || self.right_delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(())
    }
}
