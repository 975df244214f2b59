//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod commands;

use axum::Router;
use axum::routing::post;

use lampctl_app::ports::{LightTransport, SnapshotStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<T, S>() -> Router<AppState<T, S>>
where
    T: LightTransport + 'static,
    S: SnapshotStore + 'static,
{
    Router::new().route("/commands", post(commands::execute::<T, S>))
}
