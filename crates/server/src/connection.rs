// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Per-connection task.

use std::{
	fmt::{self, Display, Formatter},
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use echocast_type::Payload;
use futures_util::{SinkExt, StreamExt};
use tokio::{
	io::AsyncWriteExt,
	net::TcpStream,
	sync::{mpsc, watch},
	time::timeout,
};
use tokio_tungstenite::{
	WebSocketStream,
	tungstenite::{
		Message,
		protocol::{CloseFrame, Role, WebSocketConfig, frame::coding::CloseCode},
	},
};
use tracing::{debug, warn};

use crate::{
	config::ServerConfig,
	handler::Handler,
	http::{self, Opening},
	registry::ServerHandle,
};

const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Identifies one accepted connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
	/// Allocate the next unused id.
	pub(crate) fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(1);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}

	pub fn as_u64(&self) -> u64 {
		self.0
	}
}

impl Display for ConnectionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "conn-{}", self.0)
	}
}

/// State shared by the accept loop and every connection task.
pub(crate) struct Shared {
	pub(crate) config: ServerConfig,
	pub(crate) handler: Arc<dyn Handler>,
	pub(crate) server: ServerHandle,
}

pub(crate) async fn handle_connection(
	mut stream: TcpStream,
	peer: SocketAddr,
	shared: Arc<Shared>,
	shutdown_rx: watch::Receiver<bool>,
) {
	let id = ConnectionId::next();
	let config = &shared.config;

	let opening = match timeout(config.handshake_timeout, http::read_opening(&mut stream, config.max_http_body)).await
	{
		Ok(Ok(opening)) => opening,
		Ok(Err(e)) => {
			debug!("{} from {} sent an unusable request: {}", id, peer, e);
			shared.handler.on_fail(&shared.server, id, &e.to_string());
			return;
		}
		Err(_) => {
			debug!("{} from {} timed out before sending a request", id, peer);
			shared.handler.on_fail(&shared.server, id, "timed out waiting for request");
			return;
		}
	};

	match opening {
		Opening::Http(request) => {
			debug!("{} {} {} from {}", id, request.method, request.resource, peer);
			let response = shared.handler.on_http(&shared.server, id, &request);
			if let Err(e) = http::write_response(&mut stream, &response, &config.user_agent).await {
				debug!("{} failed to write HTTP response: {}", id, e);
			}
		}
		Opening::WebSocket {
			accept,
			leftover,
		} => serve_websocket(stream, peer, id, shared, shutdown_rx, &accept, leftover).await,
	}
}

async fn serve_websocket(
	mut stream: TcpStream,
	peer: SocketAddr,
	id: ConnectionId,
	shared: Arc<Shared>,
	mut shutdown_rx: watch::Receiver<bool>,
	accept: &str,
	leftover: Vec<u8>,
) {
	let config = &shared.config;

	if let Err(e) = stream.write_all(&http::upgrade_response(accept, &config.user_agent)).await {
		debug!("{} handshake with {} failed: {}", id, peer, e);
		shared.handler.on_fail(&shared.server, id, &e.to_string());
		return;
	}

	let mut ws_config = WebSocketConfig::default();
	ws_config.max_message_size = config.max_message_size;
	let ws_stream = WebSocketStream::from_partially_read(stream, leftover, Role::Server, Some(ws_config)).await;

	let (mut write, mut read) = ws_stream.split();
	let (tx, mut rx) = mpsc::channel::<Message>(config.outgoing_capacity);

	shared.server.register(id, tx);
	debug!("{} opened by {}", id, peer);
	shared.handler.on_open(&shared.server, id);

	let mut closing = *shutdown_rx.borrow();
	if closing {
		let _ = write.send(going_away()).await;
	}

	while !closing {
		tokio::select! {
			biased;

			result = shutdown_rx.changed() => {
				if result.is_err() || *shutdown_rx.borrow() {
					let _ = write.send(going_away()).await;
					closing = true;
				}
			}

			outgoing = rx.recv() => {
				match outgoing {
					Some(message) => {
						if let Err(e) = write.send(message).await {
							warn!("{} write failed: {}", id, e);
							break;
						}
					}
					// Closed through the handle.
					None => {
						let _ = write.send(Message::Close(None)).await;
						closing = true;
					}
				}
			}

			incoming = read.next() => {
				match incoming {
					Some(Ok(Message::Close(frame))) => {
						debug!("{} closed by client: {:?}", id, frame);
						break;
					}
					Some(Ok(message)) => {
						if let Some(payload) = Payload::from_message(message) {
							shared.handler.on_message(&shared.server, id, payload);
						}
					}
					Some(Err(e)) => {
						warn!("{} read failed: {}", id, e);
						break;
					}
					None => break,
				}
			}
		}
	}

	shared.server.unregister(id);

	if closing {
		let drain = async {
			while let Some(Ok(message)) = read.next().await {
				if message.is_close() {
					break;
				}
			}
		};
		let _ = timeout(CLOSE_DRAIN_TIMEOUT, drain).await;
	}
	let _ = write.close().await;

	debug!("{} closed", id);
	shared.handler.on_close(&shared.server, id);
}

fn going_away() -> Message {
	Message::Close(Some(CloseFrame {
		code: CloseCode::Away,
		reason: "server shutting down".into(),
	}))
}
