//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the configured address and spawns a Connection task for
//! each incoming client. Tasks are tracked by the matrix so shutdown can wait
//! for every session to finish its cleanup.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn};

use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::Matrix;

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listener bound");

        Ok(Self {
            listener,
            matrix,
            registry: Arc::new(Registry::new()),
        })
    }

    /// Accept connections until the matrix's shutdown token is cancelled.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.matrix.shutdown_token();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Gateway stopped accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        if self.matrix.is_shutting_down() {
                            debug!(%addr, "Connection refused during shutdown");
                            continue;
                        }
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!(%addr, error = %e, "Failed to set TCP_NODELAY");
                        }

                        let id = self.matrix.next_client_id();
                        info!(client = id, %addr, "Connection accepted");

                        let connection = Connection::new(
                            id,
                            stream,
                            addr,
                            Arc::clone(&self.matrix),
                            Arc::clone(&self.registry),
                        );
                        self.matrix.tracker().spawn(async move {
                            if let Err(e) = connection.run().await {
                                error!(client = id, %addr, error = %e, "Connection error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
            }
        }

        Ok(())
    }
}
