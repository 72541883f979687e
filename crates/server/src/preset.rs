// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ready-made handlers for the two client programs.

use echocast_type::Payload;
use tracing::{debug, warn};

use crate::{connection::ConnectionId, handler::Handler, registry::ServerHandle};

/// Sends every message back to the connection it came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Handler for Echo {
	fn on_message(&self, server: &ServerHandle, connection: ConnectionId, payload: Payload) {
		if let Err(e) = server.send(connection, payload) {
			warn!("echo to {} dropped: {}", connection, e);
		}
	}
}

/// Relays every message to all open connections, the sender included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Broadcast;

impl Handler for Broadcast {
	fn on_open(&self, server: &ServerHandle, connection: ConnectionId) {
		debug!("{} joined, {} listening", connection, server.len());
	}

	fn on_message(&self, server: &ServerHandle, connection: ConnectionId, payload: Payload) {
		let recipients = server.broadcast(payload);
		debug!("relayed message from {} to {} connections", connection, recipients);
	}
}
