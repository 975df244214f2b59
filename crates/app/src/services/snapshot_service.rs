//! Snapshot service: named bulb-state snapshots on top of [`SnapshotStore`].

use lampctl_domain::error::LampError;
use lampctl_domain::light::BulbState;
use lampctl_domain::target::CanonicalKey;

use crate::ports::SnapshotStore;

/// Application service for saving and loading bulb-state snapshots.
pub struct SnapshotService<S> {
    store: S,
}

impl<S: SnapshotStore> SnapshotService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Look up the states saved for `key`, in slot `name` or the default slot.
    ///
    /// Returns `Ok(None)` when no such snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn load_states(
        &self,
        key: &CanonicalKey,
        name: Option<&str>,
    ) -> Result<Option<Vec<BulbState>>, LampError> {
        let config = self.store.load().await?;
        Ok(config.lookup(key, name).map(<[BulbState]>::to_vec))
    }

    /// Save `states` for `key`, replacing the slot and keeping every other
    /// key and slot as stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self, states), fields(count = states.len()))]
    pub async fn store_states(
        &self,
        key: CanonicalKey,
        name: Option<String>,
        states: Vec<BulbState>,
    ) -> Result<(), LampError> {
        let mut config = self.store.load().await?;
        config.record(key, name, states, lampctl_domain::time::now());
        self.store.save(&config).await?;
        tracing::info!("snapshot saved");
        Ok(())
    }
}
