//! JSON-file implementation of [`SnapshotStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lampctl_app::ports::SnapshotStore;
use lampctl_domain::error::LampError;
use lampctl_domain::snapshot::PersistedConfiguration;

use crate::error::StorageError;

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store reading and writing `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn read(path: PathBuf) -> Result<PersistedConfiguration, StorageError> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot file yet");
            return Ok(PersistedConfiguration::default());
        }
        Err(source) => return Err(StorageError::Io { path, source }),
    };
    serde_json::from_slice(&bytes).map_err(|source| StorageError::Json { path, source })
}

async fn write(path: PathBuf, config: PersistedConfiguration) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(&config).map_err(|source| StorageError::Json {
        path: path.clone(),
        source,
    })?;
    let temp = temp_path(&path);
    if let Err(source) = tokio::fs::write(&temp, &bytes).await {
        return Err(StorageError::Io { path: temp, source });
    }
    if let Err(source) = tokio::fs::rename(&temp, &path).await {
        return Err(StorageError::Io { path, source });
    }
    tracing::debug!(path = %path.display(), groups = config.states.len(), "snapshot file written");
    Ok(())
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> impl Future<Output = Result<PersistedConfiguration, LampError>> + Send {
        let path = self.path.clone();
        async move { Ok(read(path).await?) }
    }

    fn save(
        &self,
        config: &PersistedConfiguration,
    ) -> impl Future<Output = Result<(), LampError>> + Send {
        let path = self.path.clone();
        let config = config.clone();
        async move { Ok(write(path, config).await?) }
    }
}
