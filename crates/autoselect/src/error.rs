//! Error types for autoselect

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading field configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for the expected shape
    #[error("Invalid field configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration has no options to offer
    #[error("Field configuration has no options")]
    EmptyOptions,
}

/// Result type for autoselect configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
