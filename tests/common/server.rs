//! Test server management.
//!
//! Spawns and manages linecastd instances for integration testing.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::sleep;

/// Knobs a test may turn; everything else uses the server defaults.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub idle_timeout: u64,
    pub max_message_len: usize,
    pub udp_port: Option<u16>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            idle_timeout: 60,
            max_message_len: 1024,
            udp_port: None,
        }
    }
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: TempDir,
}

impl TestServer {
    /// Spawn a test server with default options.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, ServerOptions::default()).await
    }

    /// Spawn a test server with the given options.
    pub async fn spawn_with(port: u16, options: ServerOptions) -> anyhow::Result<Self> {
        let data_dir = tempfile::Builder::new()
            .prefix(&format!("linecast-test-{port}-"))
            .tempdir()?;
        let dir = data_dir.path().display();

        let mut config = format!(
            r#"
[server]
name = "test.linecast"
metrics_port = 0

[listen]
address = "127.0.0.1:{port}"

[limits]
idle_timeout = {idle}
max_message_len = {max_len}

[storage]
log_dir = '{dir}/logs'
metrics_file = '{dir}/metrics.csv'
"#,
            idle = options.idle_timeout,
            max_len = options.max_message_len,
        );
        if let Some(udp_port) = options.udp_port {
            config.push_str(&format!(
                "\n[udp]\naddress = \"127.0.0.1:{udp_port}\"\nsweep_interval = 1\n"
            ));
        }

        let config_path = data_dir.path().join("linecast.toml");
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_linecastd"))
            .arg(&config_path)
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    ///
    /// The readiness session quits and is read to EOF, so by the time this
    /// returns it is no longer registered.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if let Ok(mut check) = tokio::net::TcpStream::connect(self.address()).await {
                check.write_all(b"bye\n").await?;
                let mut sink = Vec::new();
                tokio::time::timeout(Duration::from_secs(5), check.read_to_end(&mut sink))
                    .await??;
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        let mut client = super::client::TestClient::connect(&self.address()).await?;
        client.greet().await?;
        Ok(client)
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.data_dir().join("metrics.csv")
    }

    pub fn log_file(&self, identity: &str) -> PathBuf {
        self.data_dir()
            .join("logs")
            .join(format!("{}.log", identity.replace(':', "_")))
    }

    /// Poll the metrics CSV until a row for `identity` shows up.
    pub async fn metrics_row(&self, identity: &str) -> anyhow::Result<Vec<String>> {
        for _ in 0..50 {
            if let Ok(content) = std::fs::read_to_string(self.metrics_file())
                && let Some(row) = content
                    .lines()
                    .find(|line| line.starts_with(&format!("{identity},")))
            {
                return Ok(row.split(',').map(str::to_string).collect());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("no metrics row for {identity}")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process; the temp dir cleans itself up.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
