//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use json_comms::{HttpServer, ServiceConfig, Shutdown};
use tokio::net::TcpListener;

/// Start the service on an ephemeral port and return its address.
#[allow(dead_code)]
pub async fn start_server(config: ServiceConfig, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

/// Config with a small JSON ceiling so limits are easy to hit.
#[allow(dead_code)]
pub fn small_limit_config(max_json_size: usize) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.json.max_json_size = max_json_size;
    config
}
