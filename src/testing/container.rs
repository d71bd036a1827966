//! Docker container management for MySQL testing

use anyhow::{Context, Result};
use credential_resolver::SecretString;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};
use mysql_provisioner::ConnectionTarget;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Root password of every test container
const ROOT_PASSWORD: &str = "testpass";

/// Configuration for a test MySQL container
pub struct MySQLContainer {
    /// Container name
    pub container_name: String,
    /// Host port to bind to
    pub host_port: u16,
    /// Image name (uses official mysql image)
    pub image_name: String,
}

impl MySQLContainer {
    /// Creates a new MySQL container configuration
    pub fn new(container_name: &str, host_port: u16) -> Self {
        Self {
            container_name: container_name.to_string(),
            host_port,
            image_name: "mysql:8.0".to_string(),
        }
    }

    /// Starts the MySQL container, replacing any container with the same name
    pub fn start(&self) -> Result<()> {
        info!("Starting MySQL container: {}", self.container_name);

        self.remove_quietly();

        let output = Command::new("docker")
            .args([
                "run",
                "--name",
                &self.container_name,
                "-e",
                &format!("MYSQL_ROOT_PASSWORD={ROOT_PASSWORD}"),
                "-p",
                &format!("{}:3306", self.host_port),
                "-d",
                &self.image_name,
            ])
            .output()
            .context("Failed to start Docker container")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to start container: {stderr}");
        }

        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Started container: {}", container_id);

        Ok(())
    }

    /// Waits for MySQL to be ready to accept connections
    pub async fn wait_until_ready(&self, timeout_secs: u64) -> Result<()> {
        info!("Waiting for MySQL to be ready...");

        let start = Instant::now();
        let timeout = Duration::from_secs(timeout_secs);

        while start.elapsed() < timeout {
            match self.test_connection().await {
                Ok(_) => {
                    info!("MySQL is ready!");
                    return Ok(());
                }
                Err(e) => {
                    debug!("Connection attempt failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(1000)).await;
                }
            }
        }

        anyhow::bail!("MySQL did not become ready within {timeout_secs} seconds")
    }

    /// Admin connection target for the provisioner
    pub fn root_target(&self) -> ConnectionTarget {
        ConnectionTarget::new(
            "127.0.0.1",
            SecretString::from("root"),
            SecretString::from(ROOT_PASSWORD),
        )
        .with_port(self.host_port)
    }

    /// Opens a root connection for assertions
    pub async fn root_conn(&self) -> Result<Conn> {
        self.connect_as("root", ROOT_PASSWORD).await
    }

    /// Opens a connection as an arbitrary account
    pub async fn connect_as(&self, user: &str, password: &str) -> Result<Conn> {
        let opts = OptsBuilder::default()
            .ip_or_hostname("127.0.0.1")
            .tcp_port(self.host_port)
            .user(Some(user))
            .pass(Some(password));
        Conn::new(opts)
            .await
            .with_context(|| format!("Failed to connect as '{user}'"))
    }

    async fn test_connection(&self) -> Result<()> {
        let mut conn = self.root_conn().await?;
        let _: Option<i32> = conn
            .query_first("SELECT 1")
            .await
            .context("Failed to execute test query")?;
        conn.disconnect().await.context("Failed to disconnect")?;
        Ok(())
    }

    fn remove_quietly(&self) {
        for action in ["stop", "rm"] {
            let _ = Command::new("docker")
                .args([action, &self.container_name])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
        }
    }

    /// Stops and removes the container
    pub fn stop(&self) -> Result<()> {
        info!("Stopping container: {}", self.container_name);

        let output = Command::new("docker")
            .args(["rm", "-f", &self.container_name])
            .output()
            .context("Failed to remove container")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("Failed to remove container (may not exist): {}", stderr);
        }

        info!("Container stopped and removed");
        Ok(())
    }
}

impl Drop for MySQLContainer {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.stop();
    }
}
