// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket server for echocast clients.
//!
//! This crate provides a tokio-tungstenite-based WebSocket server. User code
//! reacts to connection events through the [`Handler`] trait and talks back
//! to clients through the [`ServerHandle`] passed to every callback.
//!
//! # Features
//!
//! - Full WebSocket protocol support (RFC 6455)
//! - Open, fail, close and message callbacks per connection
//! - Plain HTTP requests routed to [`Handler::on_http`]
//! - Send to a single connection or broadcast to all of them
//! - Connection limits via semaphore
//! - Graceful shutdown with connection draining
//!
//! # Example
//!
//! ```no_run
//! use echocast_server::{Echo, ServerConfig, WsServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! 	let mut server = WsServer::new(ServerConfig::new().bind_addr("127.0.0.1:9000"), Echo);
//! 	let addr = server.start().await?;
//! 	println!("listening on {}", addr);
//!
//! 	tokio::signal::ctrl_c().await?;
//! 	server.shutdown().await?;
//! 	Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod http;
pub mod preset;
pub mod registry;
pub mod subsystem;

pub use config::ServerConfig;
pub use connection::ConnectionId;
pub use echocast_type::Payload;
pub use error::{Error, Result};
pub use handler::Handler;
pub use http::{HttpRequest, HttpResponse};
pub use preset::{Broadcast, Echo};
pub use registry::ServerHandle;
pub use subsystem::WsServer;
