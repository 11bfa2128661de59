//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!   socket read half ──▶ FramedRead<LineCodec> ──▶ Registry::dispatch
//!                                                        │
//!   other sessions ──▶ Client::send ──▶ mpsc queue ◀─────┘
//!                                           │
//!   socket write half ◀── FramedWrite ◀── writer task
//! ```
//!
//! The writer task is the only owner of the write half, so lines from any
//! number of senders reach the socket whole and in queue order. Closing the
//! client (QUIT, KILL, SendQ overflow, shutdown) cancels its token; the read
//! loop then exits into cleanup and the writer flushes what is queued.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tinyircd_proto::{LineCodec, Message};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use crate::error::HandlerError;
use crate::handlers::{Context, Registry};
use crate::state::{Client, ClientId, Matrix};
use crate::telemetry::spans;

/// Quit reason when the peer goes away without QUIT.
const EOF_REASON: &str = "Connection closed";

/// A client connection handler.
pub struct Connection {
    id: ClientId,
    addr: SocketAddr,
    stream: TcpStream,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        id: ClientId,
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            id,
            addr,
            stream,
            matrix,
            registry,
        }
    }

    /// Run the connection until the peer leaves or the client is closed.
    pub async fn run(self) -> anyhow::Result<()> {
        let span = spans::connection(self.id, self.addr);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> anyhow::Result<()> {
        let Self {
            id,
            addr,
            stream,
            matrix,
            registry,
        } = self;

        let limits = &matrix.config.limits;
        let (outbound_tx, outbound_rx) = mpsc::channel::<Arc<str>>(limits.sendq.max(1));
        let client = Arc::new(Client::new(id, addr, outbound_tx));

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(limits.max_line_length));
        let writer = tokio::spawn(
            write_loop(
                FramedWrite::new(write_half, LineCodec::with_max_len(limits.max_line_length)),
                outbound_rx,
                client.close_token(),
            )
            .in_current_span(),
        );

        if !matrix.register_session(client.clone()) {
            client.close_with("Server shutting down");
        }
        info!(server = %matrix.server_name(), "Client connected");

        let closed = client.close_token();
        loop {
            tokio::select! {
                _ = closed.cancelled() => break,
                frame = reader.next() => match frame {
                    Some(Ok(line)) => {
                        if !handle_line(&matrix, &registry, &client, &line).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Read error");
                        break;
                    }
                    None => {
                        debug!("Peer closed connection");
                        break;
                    }
                },
            }
        }

        let reason = client.quit_reason().unwrap_or_else(|| EOF_REASON.to_string());
        matrix.disconnect(&client, &reason);
        client.close();

        if let Err(e) = writer.await {
            warn!(error = %e, "Writer task failed");
        }
        info!(reason = %reason, "Client disconnected");
        Ok(())
    }
}

/// Parse and dispatch one inbound line. Returns `false` when the session ends.
async fn handle_line(
    matrix: &Arc<Matrix>,
    registry: &Registry,
    client: &Arc<Client>,
    line: &str,
) -> bool {
    let msg = match Message::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(error = %e, "Ignoring unparsable line");
            return true;
        }
    };
    debug!(raw = %line, "Received message");
    client.touch();

    let mut ctx = Context::new(client, matrix);
    match registry.dispatch(&mut ctx, &msg).await {
        Ok(()) => !client.is_closed(),
        Err(HandlerError::Quit(_)) => false,
        Err(e) => {
            let reply = e.to_reply(
                matrix.server_name(),
                client.state().nick_or_star(),
                &msg.command,
            );
            if let Some(reply) = reply {
                client.send(reply);
            }
            true
        }
    }
}

/// Drain the outbound queue into the socket until the client is closed, then
/// flush whatever is still queued and shut the write half down.
async fn write_loop(
    mut writer: FramedWrite<OwnedWriteHalf, LineCodec>,
    mut outbound: mpsc::Receiver<Arc<str>>,
    closed: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            line = outbound.recv() => match line {
                Some(line) => {
                    if let Err(e) = writer.send(line).await {
                        debug!(error = %e, "Write error");
                        closed.cancel();
                        return;
                    }
                }
                None => break,
            },
            _ = closed.cancelled() => break,
        }
    }

    while let Ok(line) = outbound.try_recv() {
        if writer.feed(line).await.is_err() {
            return;
        }
    }
    let _ = SinkExt::<Arc<str>>::flush(&mut writer).await;
    let _ = SinkExt::<Arc<str>>::close(&mut writer).await;
}
