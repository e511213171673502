//! HTTP server
//!
//! Accepts connections until the cancellation token fires; each connection
//! is served on its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{handlers, AppState};

/// HTTP server for the sync trigger and call-event webhook
pub struct WebhookServer {
    state: Arc<AppState>,
    listener: TcpListener,
}

impl WebhookServer {
    /// Binds the listening socket
    ///
    /// # Arguments
    /// * `state` - Use cases shared by all requests
    /// * `addr` - Address to bind; port 0 picks a free port
    pub async fn bind(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Self { state, listener })
    }

    /// Address the server is actually listening on
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "Webhook server listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    debug!(%peer, "Accepted connection");
                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| handlers::handle(req, Arc::clone(&state)));

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, "Webhook HTTP connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("Webhook server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
