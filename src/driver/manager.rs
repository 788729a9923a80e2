use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::types::BrowserType;

/// Starts and tracks WebDriver server processes (geckodriver, chromedriver)
#[derive(Default)]
pub struct DriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> MutexGuard<'_, Vec<DriverProcess>> {
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ensure a WebDriver is reachable for the given browser type.
    /// Returns the URL to connect to.
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        let managed_urls: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == browser_type)
            .map(|p| p.url.clone())
            .collect();

        for url in managed_urls {
            if Self::is_driver_ready(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // A driver the user started by hand on the well-known port
        let standard_url = format!("http://localhost:{}", browser_type.default_port());
        if Self::is_driver_ready(&standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url);
        }

        info!("WebDriver not detected, starting {}", browser_type.driver_command());
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let command = browser_type.driver_command();
        let port = Self::find_free_port(browser_type)?;
        let args = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Install it or pass --webdriver-url to attach to a running WebDriver server",
                command
            );
        }

        let mut cmd = Command::new(command);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        // Own process group so the browser children die with the driver
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;
        let url = format!("http://localhost:{}", port);

        self.processes().push(DriverProcess {
            browser_type,
            child,
            port,
            url: url.clone(),
        });

        // 3 seconds total
        for _ in 0..30 {
            if Self::is_driver_running(&url).await {
                info!("WebDriver started on port {}", port);
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.stop_port(port);
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let probe = "which";
        #[cfg(windows)]
        let probe = "where";

        Command::new(probe)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Preferred port for the browser's driver, else whatever the OS hands out
    pub fn find_free_port(browser_type: BrowserType) -> Result<u16> {
        let base = browser_type.default_port();
        for port in base..base + 3 {
            if !Self::is_port_in_use(port) {
                return Ok(port);
            }
            debug!("Port {} is in use", port);
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        Ok(port)
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Check if a WebDriver answers `/status` at the given URL
    pub async fn is_driver_running(url: &str) -> bool {
        Self::status(url).await.is_some()
    }

    /// A running driver that also reports `ready: true`
    async fn is_driver_ready(url: &str) -> bool {
        Self::status(url)
            .await
            .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
            .unwrap_or(false)
    }

    async fn status(url: &str) -> Option<serde_json::Value> {
        let response = reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(Duration::from_secs(1))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .or(Some(serde_json::Value::Null))
    }

    fn stop_port(&self, port: u16) {
        let mut processes = self.processes();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let mut process = processes.remove(index);
            Self::terminate(&mut process);
        }
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let mut processes = self.processes();
        for process in processes.iter_mut() {
            Self::terminate(process);
        }
        processes.clear();
    }

    fn terminate(process: &mut DriverProcess) {
        debug!("Stopping WebDriver on port {}", process.port);

        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            let pgid = Pid::from_raw(process.child.id() as i32);
            if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                debug!("Failed to signal process group {}: {}", pgid, e);
            }
        }

        let _ = process.child.kill();
        let _ = process.child.wait();
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_DRIVER_MANAGER: DriverManager = DriverManager::new();
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
