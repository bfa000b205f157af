//! Error types for the Tango client

use tango_core::TangoError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while invoking docker or ssh
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration, image or node selection error
    #[error(transparent)]
    Core(#[from] TangoError),

    /// The program could not be started at all
    #[error("Failed to execute '{program}': {source}. Is it installed?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A local command exited unsuccessfully
    #[error("Command failed: {command} (status {})", display_code(.code))]
    CommandFailed {
        /// Full command line, for display
        command: String,
        /// Exit code, or None if killed by a signal
        code: Option<i32>,
        /// Captured stderr, empty when output was streamed
        stderr: String,
    },

    /// A command run over ssh exited unsuccessfully
    #[error("Command failed on {fqdn}: {command}. Status code: {}", display_code(.code))]
    RemoteFailed {
        fqdn: String,
        command: String,
        code: Option<i32>,
    },

    /// A node has no volumes directory configured
    #[error("No volumes_path configured for node '{0}'")]
    NoVolumesPath(String),
}

impl ClientError {
    /// Exit code of the failed process, if the error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } | Self::RemoteFailed { code, .. } => *code,
            _ => None,
        }
    }

    /// Check if ssh itself failed to connect (ssh exits with 255)
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::RemoteFailed { code: Some(255), .. })
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}
