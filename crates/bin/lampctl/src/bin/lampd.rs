//! # lampd: lampctl daemon
//!
//! Serves the HTTP ingress: commands posted to `/api/commands` run in the
//! background against the configured transport, one at a time.
//! Shuts down on Ctrl-C.

use lampctl::config::{Config, TransportKind};
use lampctl::{command_service, init_tracing};
use lampctl_adapter_http_axum::router;
use lampctl_adapter_http_axum::state::AppState;
use lampctl_adapter_lifx::LifxTransport;
use lampctl_adapter_virtual::VirtualTransport;
use lampctl_app::ports::LightTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    match config.transport.kind {
        TransportKind::Lifx => {
            let transport = LifxTransport::bind(config.lifx.clone()).await?;
            serve(&config, transport).await
        }
        TransportKind::Virtual => {
            let transport = VirtualTransport::new(&config.virtual_bulbs);
            serve(&config, transport).await
        }
    }
}

async fn serve<T>(config: &Config, transport: T) -> anyhow::Result<()>
where
    T: LightTransport + 'static,
{
    let state = AppState::new(command_service(config, transport));
    let app = router::build(state, config.server.static_dir.as_deref());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, transport = ?config.transport.kind, "lampd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("lampd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
