//! HTTP server bootstrap.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, router).await
}
