//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless: the second install fails quietly.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;

    use tracing::{Span, debug_span, info_span};

    /// Span wrapping a client connection's lifetime.
    pub fn connection(id: u64, addr: SocketAddr) -> Span {
        info_span!("connection", id = id, addr = %addr)
    }

    /// Span for a single dispatched command.
    pub fn command(name: &str, client: u64, nick: &str) -> Span {
        debug_span!("irc.command", command = %name, client = client, nick = %nick)
    }
}
