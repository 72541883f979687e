// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use crate::error::{Error, Result};

/// Address both client programs talk to.
pub const DEFAULT_URL: &str = "ws://localhost:9000";

/// Client connection settings.
///
/// ```
/// use std::time::Duration;
///
/// use echocast_client::ClientConfig;
///
/// let config = ClientConfig::new().url("127.0.0.1:9001").connect_timeout(Duration::from_secs(2));
/// assert_eq!(config.resolved_url().unwrap(), "ws://127.0.0.1:9001");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
	pub url: String,
	pub connect_timeout: Duration,
	/// Largest accepted incoming message, `None` for the library default.
	pub max_message_size: Option<usize>,
	/// Capacity of the inbound and outbound message queues.
	pub channel_capacity: usize,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_URL.to_string(),
			connect_timeout: Duration::from_secs(10),
			max_message_size: Some(1 << 20),
			channel_capacity: 32,
		}
	}
}

impl ClientConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	pub fn connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn max_message_size(mut self, size: Option<usize>) -> Self {
		self.max_message_size = size;
		self
	}

	pub fn channel_capacity(mut self, capacity: usize) -> Self {
		self.channel_capacity = capacity.max(1);
		self
	}

	/// The url to dial: bare `host:port` gets a `ws://` scheme, anything
	/// other than `ws`/`wss` is rejected.
	pub fn resolved_url(&self) -> Result<String> {
		let url = self.url.trim();
		if url.is_empty() {
			return Err(Error::InvalidUrl {
				url: self.url.clone(),
				reason: "url is empty".to_string(),
			});
		}

		match url.split_once("://") {
			Some(("ws", rest)) | Some(("wss", rest)) if !rest.is_empty() => Ok(url.to_string()),
			Some(("ws", _)) | Some(("wss", _)) => Err(Error::InvalidUrl {
				url: self.url.clone(),
				reason: "missing host".to_string(),
			}),
			Some((scheme, _)) => Err(Error::InvalidUrl {
				url: self.url.clone(),
				reason: format!("unsupported scheme '{}'", scheme),
			}),
			None => Ok(format!("ws://{}", url)),
		}
	}
}
