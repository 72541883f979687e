// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use echocast_server::{Broadcast, Echo, Handler, ServerConfig, WsServer};

/// Loopback config on an ephemeral port with short timeouts.
pub fn test_config() -> ServerConfig {
	ServerConfig::new()
		.bind_addr("127.0.0.1:0")
		.handshake_timeout(Duration::from_secs(2))
		.shutdown_timeout(Duration::from_secs(5))
		.user_agent("echocast-test")
}

/// Start a server with the given config and handler.
pub async fn spawn_server(config: ServerConfig, handler: impl Handler) -> WsServer {
	let mut server = WsServer::new(config, handler);
	server.start().await.expect("failed to start test server");
	server
}

pub async fn spawn_echo() -> WsServer {
	spawn_server(test_config(), Echo).await
}

pub async fn spawn_broadcast() -> WsServer {
	spawn_server(test_config(), Broadcast).await
}
