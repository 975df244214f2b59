//! Axum router assembly.

use std::path::Path;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use lampctl_app::ports::{LightTransport, SnapshotStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and, when `static_dir` is given, serves
/// its files for every other path. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<T, S>(state: AppState<T, S>, static_dir: Option<&Path>) -> Router
where
    T: LightTransport + 'static,
    S: SnapshotStore + 'static,
{
    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes());
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
