//! Storage-specific error type wrapping I/O and JSON errors.

use std::path::PathBuf;

use lampctl_domain::error::LampError;

/// Errors originating from the JSON snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming the file failed.
    #[error("cannot access `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold a snapshot document.
    #[error("malformed snapshot file `{path}`")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for LampError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
