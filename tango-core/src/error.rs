//! Error types for Tango core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, TangoError>;

/// Errors raised while loading configuration or interpreting arguments
#[derive(Debug, Error)]
pub enum TangoError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected shape
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// The configuration parsed but breaks a rule
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// An image name or reference is malformed
    #[error("Invalid image name '{name}': {reason}")]
    InvalidImageName { name: String, reason: String },

    /// A node list argument is malformed
    #[error("Invalid node list '{0}': node names must be separated by commas without empty entries")]
    InvalidNodeList(String),

    /// A node name is not present in the configuration
    #[error("Unknown node '{name}' (known nodes: {known})")]
    UnknownNode { name: String, known: String },
}

impl TangoError {
    /// Create an image name error
    pub fn invalid_image(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImageName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from the configuration file
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. } | Self::ConfigParse(_) | Self::InvalidConfig(_)
        )
    }
}
