// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A handler that reports every server callback to the test.

use std::{sync::Arc, time::Duration};

use echocast_server::{ConnectionId, Handler, HttpRequest, HttpResponse, ServerHandle};
use echocast_type::Payload;
use tokio::{sync::mpsc, time::timeout};

use crate::util::wait::DEFAULT_TIMEOUT;

/// One server callback, as observed by [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Open(ConnectionId),
	Fail(ConnectionId, String),
	Close(ConnectionId),
	Message(ConnectionId, Payload),
	Http(ConnectionId, HttpRequest),
}

impl Event {
	pub fn connection(&self) -> ConnectionId {
		match self {
			Event::Open(id)
			| Event::Fail(id, _)
			| Event::Close(id)
			| Event::Message(id, _)
			| Event::Http(id, _) => *id,
		}
	}
}

/// Records callbacks, then forwards them to an optional inner handler.
pub struct Recorder {
	tx: mpsc::UnboundedSender<Event>,
	inner: Option<Arc<dyn Handler>>,
}

impl Recorder {
	pub fn new() -> (Self, Events) {
		let (tx, rx) = mpsc::unbounded_channel();
		(
			Self {
				tx,
				inner: None,
			},
			Events {
				rx,
			},
		)
	}

	pub fn wrap(inner: impl Handler) -> (Self, Events) {
		let (mut recorder, events) = Self::new();
		recorder.inner = Some(Arc::new(inner));
		(recorder, events)
	}

	fn record(&self, event: Event) {
		let _ = self.tx.send(event);
	}
}

impl Handler for Recorder {
	fn on_open(&self, server: &ServerHandle, connection: ConnectionId) {
		self.record(Event::Open(connection));
		if let Some(inner) = &self.inner {
			inner.on_open(server, connection);
		}
	}

	fn on_fail(&self, server: &ServerHandle, connection: ConnectionId, reason: &str) {
		self.record(Event::Fail(connection, reason.to_string()));
		if let Some(inner) = &self.inner {
			inner.on_fail(server, connection, reason);
		}
	}

	fn on_close(&self, server: &ServerHandle, connection: ConnectionId) {
		self.record(Event::Close(connection));
		if let Some(inner) = &self.inner {
			inner.on_close(server, connection);
		}
	}

	fn on_message(&self, server: &ServerHandle, connection: ConnectionId, payload: Payload) {
		self.record(Event::Message(connection, payload.clone()));
		if let Some(inner) = &self.inner {
			inner.on_message(server, connection, payload);
		}
	}

	fn on_http(&self, server: &ServerHandle, connection: ConnectionId, request: &HttpRequest) -> HttpResponse {
		self.record(Event::Http(connection, request.clone()));
		match &self.inner {
			Some(inner) => inner.on_http(server, connection, request),
			None => HttpResponse::not_found(),
		}
	}
}

/// Receiving end of a [`Recorder`].
pub struct Events {
	rx: mpsc::UnboundedReceiver<Event>,
}

impl Events {
	/// Next event, panicking if none arrives within the default timeout.
	pub async fn next(&mut self) -> Event {
		self.next_within(DEFAULT_TIMEOUT).await.expect("no server event before timeout")
	}

	pub async fn next_within(&mut self, limit: Duration) -> Option<Event> {
		timeout(limit, self.rx.recv()).await.ok().flatten()
	}

	/// Wait for the next `Open` event, skipping anything else.
	pub async fn opened(&mut self) -> ConnectionId {
		loop {
			if let Event::Open(id) = self.next().await {
				return id;
			}
		}
	}

	/// Events already delivered, without waiting.
	pub fn drain(&mut self) -> Vec<Event> {
		let mut events = Vec::new();
		while let Ok(event) = self.rx.try_recv() {
			events.push(event);
		}
		events
	}
}
