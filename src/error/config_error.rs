use std::path::PathBuf;

/// Represents all failures while loading an engine configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    Io {
        /// The file that was read.
        path:   PathBuf,
        /// The underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for an engine configuration.
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// Delimiters must be non-empty.
    #[error("Invalid configuration: delimiters cannot be empty.")]
    EmptyDelimiter,
}
