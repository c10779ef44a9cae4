use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("path {path} resolves outside base directory {base}")]
    PathEscape { path: PathBuf, base: PathBuf },
    #[error("filesystem error at {path}: {source}")]
    Filesystem { source: io::Error, path: PathBuf },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("failed to parse payload: {source}")]
    Payload { source: serde_json::Error },
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl OrganizerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OrganizerError::Filesystem {
            source,
            path: path.into(),
        }
    }

    /// PathEscape is never corrected or retried; everything else is an ordinary per-item failure.
    pub fn is_fatal_for_item(&self) -> bool {
        matches!(self, OrganizerError::PathEscape { .. })
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
