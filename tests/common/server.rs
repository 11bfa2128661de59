//! Test server management.
//!
//! Writes a config into a temporary directory, spawns the compiled binary
//! against it and kills the process when dropped.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep};

/// Operator credentials present in every test config.
#[allow(dead_code)]
pub const OPER_NAME: &str = "testop";
#[allow(dead_code)]
pub const OPER_PASSWORD: &str = "testpass";

/// A running server process.
pub struct TestServer {
    child: Option<Child>,
    port: u16,
    _dir: TempDir,
}

impl TestServer {
    /// Spawn a server with the default test config.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with("").await
    }

    /// Spawn a server with `extra` TOML appended to the default test config.
    pub async fn spawn_with(extra: &str) -> anyhow::Result<Self> {
        let port = free_port()?;
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, test_config(port, extra))?;

        let child = Command::new(binary_path())
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let mut server = Self {
            child: Some(child),
            port,
            _dir: dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// `127.0.0.1:<port>`.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Wait for the process to exit on its own, up to `limit`.
    #[allow(dead_code)]
    pub async fn wait_for_exit(&mut self, limit: Duration) -> anyhow::Result<bool> {
        let deadline = Instant::now() + limit;
        let Some(child) = self.child.as_mut() else {
            return Ok(true);
        };
        while Instant::now() < deadline {
            if let Some(status) = child.try_wait()? {
                self.child = None;
                return Ok(status.success());
            }
            sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server still running after {limit:?}")
    }

    async fn wait_until_ready(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(child) = self.child.as_mut()
                && let Some(status) = child.try_wait()?
            {
                anyhow::bail!("server exited during startup: {status}");
            }
            if TcpStream::connect(self.address()).await.is_ok() {
                return Ok(());
            }
            sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not start listening on {}", self.address())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tinyircd"))
}

/// Ask the OS for an unused port. The listener is dropped before the server binds.
fn free_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn test_config(port: u16, extra: &str) -> String {
    format!(
        r#"[server]
name = "test.server"
network = "TestNet"

[listen]
address = "127.0.0.1:{port}"

[logging]
level = "warn"

[[oper]]
name = "{OPER_NAME}"
password = "{OPER_PASSWORD}"

{extra}
"#
    )
}
