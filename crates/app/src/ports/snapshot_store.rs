//! Snapshot store port: durable home of [`PersistedConfiguration`].

use std::future::Future;

use lampctl_domain::error::LampError;
use lampctl_domain::snapshot::PersistedConfiguration;

/// Loads and saves the whole snapshot document.
///
/// Callers do read-modify-write within a single run; no cross-process
/// locking is expected.
pub trait SnapshotStore: Send + Sync {
    /// Load the document, or an empty one if nothing was saved yet.
    fn load(&self) -> impl Future<Output = Result<PersistedConfiguration, LampError>> + Send;

    /// Replace the stored document.
    fn save(
        &self,
        config: &PersistedConfiguration,
    ) -> impl Future<Output = Result<(), LampError>> + Send;
}

impl<T: SnapshotStore> SnapshotStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<PersistedConfiguration, LampError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        config: &PersistedConfiguration,
    ) -> impl Future<Output = Result<(), LampError>> + Send {
        (**self).save(config)
    }
}
