// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	/// Address and port to bind to (e.g., "127.0.0.1:9000"). Port 0 picks a
	/// free port.
	pub bind_addr: String,
	/// Maximum number of concurrent connections.
	pub max_connections: usize,
	/// Value of the `Server` header on handshake and HTTP responses.
	pub user_agent: String,
	/// Time allowed for a client to complete its opening request.
	pub handshake_timeout: Duration,
	/// Time allowed for open connections to drain on shutdown.
	pub shutdown_timeout: Duration,
	/// Largest accepted incoming message, `None` for the library default.
	pub max_message_size: Option<usize>,
	/// Largest accepted body of a plain HTTP request.
	pub max_http_body: usize,
	/// Messages queued per connection before sends to it are refused.
	pub outgoing_capacity: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			bind_addr: "127.0.0.1:9000".to_string(),
			max_connections: 1024,
			user_agent: format!("echocast/{}", env!("CARGO_PKG_VERSION")),
			handshake_timeout: Duration::from_secs(5),
			shutdown_timeout: Duration::from_secs(30),
			max_message_size: Some(1 << 20),
			max_http_body: 64 * 1024,
			outgoing_capacity: 256,
		}
	}
}

impl ServerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
		self.bind_addr = addr.into();
		self
	}

	pub fn max_connections(mut self, max: usize) -> Self {
		self.max_connections = max;
		self
	}

	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();
		self
	}

	pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
		self.handshake_timeout = timeout;
		self
	}

	pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout = timeout;
		self
	}

	pub fn max_message_size(mut self, size: Option<usize>) -> Self {
		self.max_message_size = size;
		self
	}

	pub fn max_http_body(mut self, size: usize) -> Self {
		self.max_http_body = size;
		self
	}

	pub fn outgoing_capacity(mut self, capacity: usize) -> Self {
		self.outgoing_capacity = capacity.max(1);
		self
	}
}
