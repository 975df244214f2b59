//! Shared application state for axum handlers.

use std::sync::Arc;

use lampctl_app::ports::{LightTransport, SnapshotStore};
use lampctl_app::services::command_service::CommandService;

/// Application state shared across all axum handlers.
///
/// Generic over the transport and snapshot store to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`: only the `Arc` wrapper is cloned.
pub struct AppState<T, S> {
    /// Command compilation and execution, one run at a time.
    pub commands: Arc<CommandService<T, S>>,
}

impl<T, S> Clone for AppState<T, S> {
    fn clone(&self) -> Self {
        Self {
            commands: Arc::clone(&self.commands),
        }
    }
}

impl<T, S> AppState<T, S>
where
    T: LightTransport + 'static,
    S: SnapshotStore + 'static,
{
    /// Create a new application state from the command service.
    pub fn new(commands: CommandService<T, S>) -> Self {
        Self {
            commands: Arc::new(commands),
        }
    }

    /// Create a new application state from a pre-wrapped `Arc` service.
    ///
    /// Use this when the service is shared with other tasks.
    pub fn from_arc(commands: Arc<CommandService<T, S>>) -> Self {
        Self { commands }
    }
}
