//! tinyircd - a small IRC-style chat server.
//!
//! One task per connection, shared state in the [`Matrix`], commands routed
//! through the handler [`Registry`](crate::handlers::Registry).

mod config;
mod error;
mod handlers;
mod motd;
mod network;
mod security;
mod state;
mod telemetry;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::network::Gateway;
use crate::state::{Matrix, ShutdownRequest};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "tinyircd", version, about = "A small IRC-style chat server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(default_value = "config.toml")]
    config: PathBuf,

    /// Read a password (twice) from stdin, print an argon2 hash for an
    /// `[[oper]]` block, and exit.
    #[arg(long)]
    gen_password_hash: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.gen_password_hash {
        return generate_password_hash();
    }

    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    telemetry::init(&config.logging);

    info!(
        server = %config.server.name,
        network = %config.server.network,
        version = %config.server.version,
        "Starting tinyircd"
    );

    let listen = config.listen.address;
    let matrix = Arc::new(Matrix::new(config));

    let gateway = Gateway::bind(listen, Arc::clone(&matrix)).await?;
    let gateway_task = tokio::spawn(gateway.run());

    let request = tokio::select! {
        request = matrix.shutdown_requested() => request,
        signal = shutdown_signal() => {
            info!(signal, "Signal received");
            ShutdownRequest::shutdown(None)
        }
    };

    matrix.shutdown(&request.notice()).await;

    match gateway_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Gateway failed"),
        Err(e) => error!(error = %e, "Gateway task panicked"),
    }

    if request.restart {
        info!("Restarting");
        return Err(restart());
    }

    Ok(())
}

/// Resolve on SIGINT or (on Unix) SIGTERM, naming the signal.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}

/// Replace this process with a fresh copy of the same binary and arguments.
///
/// Only returns on failure.
fn restart() -> anyhow::Error {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return anyhow::Error::new(e).context("cannot locate own executable"),
    };
    let mut command = std::process::Command::new(&exe);
    command.args(std::env::args_os().skip(1));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        anyhow::Error::new(command.exec()).context(format!("exec {} failed", exe.display()))
    }

    #[cfg(not(unix))]
    {
        match command.spawn() {
            Ok(_) => std::process::exit(0),
            Err(e) => anyhow::Error::new(e).context(format!("spawn {} failed", exe.display())),
        }
    }
}

/// `--gen-password-hash`: read password and confirmation, print the hash.
fn generate_password_hash() -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    eprint!("Password: ");
    let password = lines.next().transpose()?.unwrap_or_default();
    eprint!("Confirm: ");
    let confirm = lines.next().transpose()?.unwrap_or_default();

    let password = password.trim_end_matches('\r');
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    if password != confirm.trim_end_matches('\r') {
        anyhow::bail!("passwords do not match");
    }

    let hash = security::password::hash_password(password)
        .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    println!("{hash}");
    Ok(())
}
