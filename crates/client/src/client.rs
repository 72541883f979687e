// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use echocast_type::Payload;
use futures_util::{
	SinkExt, StreamExt,
	stream::{SplitSink, SplitStream},
};
use tokio::{
	net::TcpStream,
	sync::{mpsc, oneshot},
	task::JoinHandle,
	time::timeout,
};
use tokio_tungstenite::{
	MaybeTlsStream, WebSocketStream, connect_async_with_config,
	tungstenite::{Message, protocol::WebSocketConfig},
};
use tracing::{debug, warn};

use crate::{
	config::ClientConfig,
	error::{Error, Result},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type Outbound = (Message, oneshot::Sender<Result<()>>);

/// How long to wait for the server's close frame after we initiated close.
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Async WebSocket client.
pub struct WsClient {
	url: String,
	outbound_tx: mpsc::Sender<Outbound>,
	inbound_rx: mpsc::Receiver<Result<Payload>>,
	shutdown_tx: Option<mpsc::Sender<()>>,
	task: Option<JoinHandle<()>>,
}

impl WsClient {
	/// Connect to the given url with default settings.
	///
	/// # Arguments
	/// * `url` - WebSocket URL of the server (e.g., "ws://localhost:9000")
	pub async fn connect(url: &str) -> Result<Self> {
		Self::connect_with(ClientConfig::new().url(url)).await
	}

	pub async fn connect_with(config: ClientConfig) -> Result<Self> {
		let url = config.resolved_url()?;

		let mut ws_config = WebSocketConfig::default();
		ws_config.max_message_size = config.max_message_size;

		let connect = connect_async_with_config(url.clone(), Some(ws_config), true);
		let (ws_stream, response) = match timeout(config.connect_timeout, connect).await {
			Ok(Ok(connected)) => connected,
			Ok(Err(source)) => {
				return Err(Error::Connect {
					url,
					source,
				});
			}
			Err(_) => {
				return Err(Error::ConnectTimeout {
					url,
					timeout: config.connect_timeout,
				});
			}
		};
		debug!("connected to {} ({})", url, response.status());

		let (write, read) = ws_stream.split();

		let (outbound_tx, outbound_rx) = mpsc::channel::<Outbound>(config.channel_capacity);
		let (inbound_tx, inbound_rx) = mpsc::channel::<Result<Payload>>(config.channel_capacity);
		let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

		let task = tokio::spawn(Self::connection_loop(write, read, outbound_rx, shutdown_rx, inbound_tx));

		Ok(Self {
			url,
			outbound_tx,
			inbound_rx,
			shutdown_tx: Some(shutdown_tx),
			task: Some(task),
		})
	}

	/// Connection management loop
	async fn connection_loop(
		mut write: SplitSink<WsStream, Message>,
		mut read: SplitStream<WsStream>,
		mut outbound_rx: mpsc::Receiver<Outbound>,
		mut shutdown_rx: mpsc::Receiver<()>,
		inbound_tx: mpsc::Sender<Result<Payload>>,
	) {
		let mut closing = false;
		// Socket reads only happen while a queue slot is held, so a full
		// inbound queue never stalls writes or shutdown.
		let mut slot = None;

		loop {
			tokio::select! {
				reserved = inbound_tx.reserve(), if slot.is_none() => {
					match reserved {
						Ok(permit) => slot = Some(permit),
						Err(_) => {
							closing = true;
							break;
						}
					}
				}

				incoming = read.next(), if slot.is_some() => {
					match incoming {
						Some(Ok(Message::Close(frame))) => {
							debug!("server closed connection: {:?}", frame);
							break;
						}
						Some(Ok(message)) => {
							if let Some(payload) = Payload::from_message(message) {
								if let Some(permit) = slot.take() {
									permit.send(Ok(payload));
								}
							}
						}
						Some(Err(e)) => {
							warn!("WebSocket read failed: {}", e);
							if let Some(permit) = slot.take() {
								permit.send(Err(Error::Transport(e)));
							}
							break;
						}
						None => break,
					}
				}

				Some((message, ack)) = outbound_rx.recv() => {
					let result = write.send(message).await.map_err(Error::from);
					let failed = result.is_err();
					let _ = ack.send(result);
					if failed {
						break;
					}
				}

				// A dropped sender counts as a shutdown request.
				_ = shutdown_rx.recv() => {
					closing = true;
					break;
				}
			}
		}

		// Sends our close frame, or flushes the reply to the server's.
		let _ = write.close().await;

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
		debug!("connection task finished");
	}

	/// Send one message and wait until it has been written to the socket.
	pub async fn send(&self, payload: impl Into<Payload>) -> Result<()> {
		let (ack_tx, ack_rx) = oneshot::channel();

		self.outbound_tx
			.send((payload.into().into_message(), ack_tx))
			.await
			.map_err(|_| Error::ConnectionClosed)?;

		ack_rx.await.map_err(|_| Error::ConnectionClosed)?
	}

	/// Receive the next message, waiting if necessary.
	///
	/// Returns `Ok(None)` once the server has closed the connection.
	pub async fn recv(&mut self) -> Result<Option<Payload>> {
		match self.inbound_rx.recv().await {
			Some(Ok(payload)) => Ok(Some(payload)),
			Some(Err(e)) => Err(e),
			None => Ok(None),
		}
	}

	/// Close the WebSocket connection gracefully.
	pub async fn close(mut self) -> Result<()> {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(()).await;
		}
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
		Ok(())
	}

	/// The url this client is connected to.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// True once the connection task has stopped accepting messages.
	pub fn is_closed(&self) -> bool {
		self.outbound_tx.is_closed()
	}
}

impl Drop for WsClient {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			// Best effort shutdown - ignore errors since we're dropping
			let _ = tx.try_send(());
		}
	}
}
