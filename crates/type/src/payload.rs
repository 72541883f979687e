// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use tokio_tungstenite::tungstenite::Message;

/// The content of one WebSocket data message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
	Text(String),
	Binary(Vec<u8>),
}

impl Payload {
	/// Extract the payload of a data frame.
	///
	/// Returns `None` for control frames and raw frames.
	pub fn from_message(message: Message) -> Option<Self> {
		match message {
			Message::Text(text) => Some(Payload::Text(text.as_str().to_owned())),
			Message::Binary(data) => Some(Payload::Binary(data.to_vec())),
			Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
		}
	}

	pub fn into_message(self) -> Message {
		match self {
			Payload::Text(text) => Message::text(text),
			Payload::Binary(data) => Message::binary(data),
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Payload::Text(text) => Some(text),
			Payload::Binary(_) => None,
		}
	}

	pub fn is_text(&self) -> bool {
		matches!(self, Payload::Text(_))
	}

	/// Length of the payload in bytes.
	pub fn len(&self) -> usize {
		match self {
			Payload::Text(text) => text.len(),
			Payload::Binary(data) => data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Display for Payload {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Payload::Text(text) => f.write_str(text),
			Payload::Binary(data) => write!(f, "<{} bytes>", data.len()),
		}
	}
}

impl From<String> for Payload {
	fn from(text: String) -> Self {
		Payload::Text(text)
	}
}

impl From<&str> for Payload {
	fn from(text: &str) -> Self {
		Payload::Text(text.to_string())
	}
}

impl From<Vec<u8>> for Payload {
	fn from(data: Vec<u8>) -> Self {
		Payload::Binary(data)
	}
}

impl From<&[u8]> for Payload {
	fn from(data: &[u8]) -> Self {
		Payload::Binary(data.to_vec())
	}
}

impl From<Payload> for Message {
	fn from(payload: Payload) -> Self {
		payload.into_message()
	}
}
