// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Async WebSocket client for echocast servers.
//!
//! [`WsClient`] owns one connection. A background task drives the socket
//! while the client exchanges [`Payload`]s with it over channels; dropping
//! the client closes the connection.
//!
//! # Example
//!
//! ```no_run
//! use echocast_client::WsClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! 	let mut client = WsClient::connect("ws://localhost:9000").await?;
//! 	client.send("Hello, world!").await?;
//! 	if let Some(reply) = client.recv().await? {
//! 		println!("Received: {}", reply);
//! 	}
//! 	client.close().await?;
//! 	Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;

pub use client::WsClient;
pub use config::{ClientConfig, DEFAULT_URL};
pub use echocast_type::Payload;
pub use error::{Error, Result};
pub use session::{GREETING, hello, listen, run_hello, run_listen};
