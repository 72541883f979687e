// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Registry of open connections.

use std::sync::Arc;

use dashmap::DashMap;
use echocast_type::Payload;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::{
	connection::ConnectionId,
	error::{Error, Result},
};

/// Cheap, clone-able access to the server's open connections.
///
/// Every [`Handler`](crate::Handler) callback receives one, so handlers can
/// reply, broadcast or disconnect clients. Each connection has an outgoing
/// queue of [`ServerConfig::outgoing_capacity`](crate::ServerConfig)
/// messages; a client that stops reading fills it and further messages for
/// that client are refused instead of buffered.
#[derive(Clone, Default)]
pub struct ServerHandle {
	connections: Arc<DashMap<ConnectionId, mpsc::Sender<Message>>>,
}

impl ServerHandle {
	pub(crate) fn register(&self, id: ConnectionId, tx: mpsc::Sender<Message>) {
		self.connections.insert(id, tx);
	}

	pub(crate) fn unregister(&self, id: ConnectionId) {
		self.connections.remove(&id);
	}

	/// Queue a message for one connection.
	///
	/// Messages sent to the same connection are written in call order. Fails
	/// with [`Error::QueueFull`] while the connection's queue is full.
	pub fn send(&self, id: ConnectionId, payload: impl Into<Payload>) -> Result<()> {
		let tx = self.connections.get(&id).ok_or(Error::UnknownConnection(id))?;
		tx.try_send(payload.into().into_message()).map_err(|e| match e {
			TrySendError::Full(_) => Error::QueueFull(id),
			TrySendError::Closed(_) => Error::UnknownConnection(id),
		})
	}

	/// Queue a message for every open connection.
	///
	/// Returns the number of connections the message was queued for.
	/// Connections with a full queue are skipped.
	pub fn broadcast(&self, payload: impl Into<Payload>) -> usize {
		let message = payload.into().into_message();
		self.connections
			.iter()
			.filter(|entry| match entry.value().try_send(message.clone()) {
				Ok(()) => true,
				Err(TrySendError::Full(_)) => {
					debug!("{} is not keeping up, dropping broadcast", entry.key());
					false
				}
				Err(TrySendError::Closed(_)) => false,
			})
			.count()
	}

	/// Close a connection once its queued messages are written.
	///
	/// The connection stops accepting messages immediately.
	pub fn close(&self, id: ConnectionId) -> Result<()> {
		// Dropping the sender ends the writer's queue.
		self.connections.remove(&id).map(|_| ()).ok_or(Error::UnknownConnection(id))
	}

	/// Ids of all open connections, oldest first.
	pub fn connections(&self) -> Vec<ConnectionId> {
		let mut ids: Vec<ConnectionId> = self.connections.iter().map(|entry| *entry.key()).collect();
		ids.sort();
		ids
	}

	pub fn is_open(&self, id: ConnectionId) -> bool {
		self.connections.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.connections.len()
	}

	pub fn is_empty(&self) -> bool {
		self.connections.is_empty()
	}
}
