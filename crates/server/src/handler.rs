// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Connection event callbacks.

use echocast_type::Payload;

use crate::{
	connection::ConnectionId,
	http::{HttpRequest, HttpResponse},
	registry::ServerHandle,
};

/// Callbacks invoked by the server.
///
/// All methods have no-op defaults, so implementors only override the events
/// they care about. For a single connection, `on_open` runs before any
/// `on_message`, and `on_close` runs last. Callbacks run on the connection's
/// task and should not block.
pub trait Handler: Send + Sync + 'static {
	/// A WebSocket handshake completed.
	fn on_open(&self, _server: &ServerHandle, _connection: ConnectionId) {}

	/// A connection failed before the WebSocket handshake completed.
	fn on_fail(&self, _server: &ServerHandle, _connection: ConnectionId, _reason: &str) {}

	/// An open WebSocket connection ended, for whatever reason.
	fn on_close(&self, _server: &ServerHandle, _connection: ConnectionId) {}

	/// A data message arrived.
	fn on_message(&self, _server: &ServerHandle, _connection: ConnectionId, _payload: Payload) {}

	/// A plain HTTP request arrived instead of a WebSocket upgrade.
	fn on_http(&self, _server: &ServerHandle, _connection: ConnectionId, _request: &HttpRequest) -> HttpResponse {
		HttpResponse::not_found()
	}
}
