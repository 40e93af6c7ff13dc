//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cgi_gateway::config::{GatewayConfig, OutputMode};
use cgi_gateway::{HttpServer, RouteDefinition, RouteTable, Shutdown};
use tokio::net::TcpListener;

/// A temporary directory of executable shell scripts, removed on drop.
pub struct ScriptDir {
    pub path: PathBuf,
}

impl ScriptDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("cgi-gateway-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    /// Write an executable `/bin/sh` script. The child runs with an empty
    /// environment, so scripts call external tools by absolute path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScriptDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A gateway running on an ephemeral port; shuts down on drop.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn config(timeout_ms: u64, output_mode: OutputMode) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.dispatch.timeout_ms = timeout_ms;
    config.dispatch.output_mode = output_mode;
    config.build.enabled = false;
    config
}

pub async fn start_gateway(config: GatewayConfig, routes: Vec<RouteDefinition>) -> Gateway {
    start_with_table(config, RouteTable::load(routes)).await
}

pub async fn start_with_table(config: GatewayConfig, table: RouteTable) -> Gateway {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, table);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

pub fn route(method: &str, path: &str, executable: &Path) -> RouteDefinition {
    let script = format!(
        "{}.roc",
        executable.file_name().unwrap().to_string_lossy()
    );
    RouteDefinition::new(method, path, script, executable)
}

/// True while a process with this pid exists (Linux only).
pub fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}
