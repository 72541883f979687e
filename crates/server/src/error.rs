// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io;

use crate::connection::ConnectionId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: io::Error,
	},

	#[error("bound address unavailable: {0}")]
	AddressUnavailable(#[source] io::Error),

	#[error("unknown connection {0}")]
	UnknownConnection(ConnectionId),

	#[error("outgoing queue of {0} is full")]
	QueueFull(ConnectionId),
}
