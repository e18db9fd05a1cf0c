//! The `serve` command.

use std::net::SocketAddr;
use std::path::Path;
use tracing::info;
use warden::Warden;

/// Run the webhook until Ctrl-C, then drain queued events.
pub async fn serve(
    config: &Path,
    bind: Option<SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    let warden = Warden::load(config)?;
    let addr = bind.unwrap_or(*warden.config().server().bind());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening for OneBot events");

    axum::serve(listener, warden.router())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
        })
        .await?;

    warden.shutdown().await;
    info!("Warden stopped");
    Ok(())
}
