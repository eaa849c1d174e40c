use std::future::{Future, IntoFuture};
use std::net::SocketAddr;

use tierchain_core::error::{Result, TierError};
use tokio::net::TcpListener;

use crate::router::{AppState, router};

/// Binds `addr` and serves until `shutdown` resolves.
///
/// Shutdown does not drain: downstream calls carry no timeout, so a request
/// stuck on a hung peer would otherwise hold the process open forever.
pub async fn run_service<F>(state: AppState, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TierError::Io(format!("bind {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| TierError::Io(format!("local addr of {addr}: {e}")))?;

    let service = state.config().service_name.clone();
    tracing::info!(port = local.port(), "{service} started on port {}", local.port());

    let serve = axum::serve(listener, router(state)).into_future();
    tokio::select! {
        res = serve => res.map_err(|e| TierError::Serve(format!("HTTP server failed: {e}"))),
        _ = shutdown => {
            tracing::debug!("stopped accepting; abandoning in-flight requests");
            Ok(())
        }
    }
}
