//! Error types for buildbar
//!
//! All modules use `BuildbarResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildbar operations
pub type BuildbarResult<T> = Result<T, BuildbarError>;

/// All errors that can occur in buildbar
#[derive(Error, Debug)]
pub enum BuildbarError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Module not found in configuration: {0}")]
    ModuleNotFound(String),

    #[error("Repository not referenced by any configured module: {0}")]
    RepoNotConfigured(String),

    // Fingerprint errors
    #[error("Source of module {module} not found at {path}")]
    SourceMissing { module: String, path: PathBuf },

    #[error("Failed to fingerprint module {module}: {reason}")]
    Fingerprint { module: String, reason: String },

    // Build-state cache errors
    #[error("Build-state cache is scoped to {found}, cannot evaluate for {expected}")]
    CacheScopeMismatch { expected: String, found: String },

    #[error("Failed to persist build-state cache {path}: {source}")]
    CachePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Command timed out after {secs}s: {command}")]
    CommandTimeout { command: String, secs: u64 },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl BuildbarError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ModuleNotFound(_) => Some("Add it under [modules.<name>] in config.toml"),
            Self::RepoNotConfigured(_) => {
                Some("Reference it from a module's `repos` key or list it in probe.extra_repos")
            }
            Self::SourceMissing { .. } => Some("Clone the repository or set the module's `source`"),
            Self::CachePersist { .. } => Some("Check permissions on the buildbar state directory"),
            _ => None,
        }
    }
}
