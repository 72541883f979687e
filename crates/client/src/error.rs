// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, time::Duration};

use tokio_tungstenite::tungstenite::{self, error::ProtocolError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid WebSocket url '{url}': {reason}")]
	InvalidUrl {
		url: String,
		reason: String,
	},

	#[error("failed to connect to {url}: {source}")]
	Connect {
		url: String,
		#[source]
		source: tungstenite::Error,
	},

	#[error("connecting to {url} timed out after {timeout:?}")]
	ConnectTimeout {
		url: String,
		timeout: Duration,
	},

	#[error("connection closed")]
	ConnectionClosed,

	#[error("transport error: {0}")]
	Transport(#[from] tungstenite::Error),

	#[error("failed to write output: {0}")]
	Output(#[from] io::Error),
}

impl Error {
	/// True when the peer went away, as opposed to a local failure.
	pub fn is_disconnect(&self) -> bool {
		match self {
			Error::ConnectionClosed => true,
			Error::Transport(e) => matches!(
				e,
				tungstenite::Error::ConnectionClosed
					| tungstenite::Error::AlreadyClosed
					| tungstenite::Error::Io(_)
					| tungstenite::Error::Protocol(
						ProtocolError::ResetWithoutClosingHandshake | ProtocolError::SendAfterClosing
					)
			),
			_ => false,
		}
	}
}
