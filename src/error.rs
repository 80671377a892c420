use thiserror::Error;

/// Unified error type for wrapper-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(String),

    #[error("Diff unavailable: {0}")]
    DiffUnavailable(String),

    #[error("Compiler probe failed: {0}")]
    ProbeFailed(String),

    #[error("Cannot parse compiler version: {0}")]
    ParseFailed(String),

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("No published versions found for package '{0}'")]
    EmptyVersionSet(String),

    #[error("Failed to persist manifest: {0}")]
    PersistenceFailed(String),

    /// The manifest was rewritten but the commit could not be recorded.
    #[error("Manifest updated to {version} but commit failed: {reason}")]
    HistoryFailed { version: String, reason: String },

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in wrapper-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    pub fn git(msg: impl Into<String>) -> Self {
        ReleaseError::Git(msg.into())
    }

    pub fn diff(msg: impl Into<String>) -> Self {
        ReleaseError::DiffUnavailable(msg.into())
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        ReleaseError::ProbeFailed(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ReleaseError::ParseFailed(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        ReleaseError::RegistryUnavailable(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        ReleaseError::PersistenceFailed(msg.into())
    }

    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// True when the error left the working tree modified.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, ReleaseError::HistoryFailed { .. })
    }
}
