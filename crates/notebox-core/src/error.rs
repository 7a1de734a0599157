//! Error types for the note store

use crate::model::NodeId;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the note store
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier absent from the addressed mapping
    #[error("Not found: {0}")]
    NotFound(NodeId),

    /// Parent exists but cannot receive this child
    #[error("Invalid parent: {0}")]
    InvalidParent(NodeId),

    /// Restore destination is not a live directory
    #[error("Invalid destination: {0}")]
    InvalidDestination(NodeId),

    /// Operation does not apply to this kind of node
    #[error("Invalid target: {0}")]
    InvalidTarget(NodeId),

    /// No note is currently selected
    #[error("No note selected")]
    NoSelection,

    /// Root directory has not been created or loaded yet
    #[error("Notebook not initialized")]
    NotInitialized,

    /// I/O error from the body store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding/decoding error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Snapshot written by an incompatible version
    #[error("Incompatible snapshot version: found={found}, expected={expected}")]
    IncompatibleSnapshot { found: u32, expected: u32 },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Persisted tree breaks the single-parent hierarchy
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Query could not be compiled
    #[error("Invalid search query: {0}")]
    InvalidQuery(#[from] regex::Error),
}

impl Error {
    /// Structural errors are precondition violations; they never leave
    /// partial state behind.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidParent(_)
                | Self::InvalidDestination(_)
                | Self::InvalidTarget(_)
        )
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "notFound",
            Self::InvalidParent(_) => "invalidParent",
            Self::InvalidDestination(_) => "invalidDestination",
            Self::InvalidTarget(_) => "invalidTarget",
            Self::NoSelection => "noSelection",
            Self::NotInitialized => "notInitialized",
            Self::Io(_) => "ioError",
            Self::Snapshot(_) | Self::IncompatibleSnapshot { .. } | Self::CorruptSnapshot(_) => {
                "snapshotError"
            }
            Self::Config(_) => "configError",
            Self::InvalidQuery(_) => "invalidQuery",
        }
    }
}
