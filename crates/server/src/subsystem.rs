// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Server lifecycle: bind, accept, shut down.

use std::{
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use tokio::{
	net::{TcpListener, TcpStream},
	spawn,
	sync::{Semaphore, watch},
	task::JoinHandle,
	time::{Instant, sleep},
};

use crate::{
	config::ServerConfig,
	connection::{Shared, handle_connection},
	error::{Error, Result},
	handler::Handler,
	registry::ServerHandle,
};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A WebSocket server driving one [`Handler`].
///
/// Connections beyond [`ServerConfig::max_connections`] are turned away
/// before their handshake.
///
/// # Example
///
/// ```no_run
/// # use echocast_server::{Echo, ServerConfig, WsServer};
/// # async fn run() -> echocast_server::Result<()> {
/// let mut server = WsServer::new(ServerConfig::new().bind_addr("127.0.0.1:0"), Echo);
///
/// let addr = server.start().await?;
/// println!("echoing on ws://{}", addr);
///
/// server.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct WsServer {
	shared: Arc<Shared>,
	local_addr: Option<SocketAddr>,
	running: Arc<AtomicBool>,
	active_connections: Arc<AtomicUsize>,
	shutdown_tx: Option<watch::Sender<bool>>,
	connection_semaphore: Arc<Semaphore>,
	accept_task: Option<JoinHandle<()>>,
}

impl WsServer {
	pub fn new(config: ServerConfig, handler: impl Handler) -> Self {
		let max_connections = config.max_connections;
		Self {
			shared: Arc::new(Shared {
				config,
				handler: Arc::new(handler),
				server: ServerHandle::default(),
			}),
			local_addr: None,
			running: Arc::new(AtomicBool::new(false)),
			active_connections: Arc::new(AtomicUsize::new(0)),
			shutdown_tx: None,
			connection_semaphore: Arc::new(Semaphore::new(max_connections)),
			accept_task: None,
		}
	}

	/// Bind and start accepting connections on the current tokio runtime.
	///
	/// Idempotent: starting a running server returns its address.
	pub async fn start(&mut self) -> Result<SocketAddr> {
		if let Some(addr) = self.local_addr.filter(|_| self.is_running()) {
			return Ok(addr);
		}

		let addr = self.shared.config.bind_addr.clone();
		let listener = TcpListener::bind(&addr).await.map_err(|source| Error::Bind {
			addr: addr.clone(),
			source,
		})?;

		let local_addr = listener.local_addr().map_err(Error::AddressUnavailable)?;
		self.local_addr = Some(local_addr);
		tracing::info!("listening on {}", local_addr);

		let (shutdown_tx, shutdown_rx) = watch::channel(false);
		self.running.store(true, Ordering::SeqCst);

		let accept = AcceptLoop {
			listener,
			shared: self.shared.clone(),
			shutdown_rx,
			running: self.running.clone(),
			active: self.active_connections.clone(),
			slots: self.connection_semaphore.clone(),
		};
		self.shutdown_tx = Some(shutdown_tx);
		self.accept_task = Some(spawn(accept.run()));

		Ok(local_addr)
	}

	/// Stop accepting, close every connection and wait for them to drain.
	pub async fn shutdown(&mut self) -> Result<()> {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(true);
		}
		if let Some(task) = self.accept_task.take() {
			let _ = task.await;
		}

		let deadline = Instant::now() + self.shared.config.shutdown_timeout;
		loop {
			let open = self.active_connections();
			if open == 0 {
				break;
			}
			if Instant::now() >= deadline {
				tracing::warn!("gave up waiting for {} connections to close", open);
				break;
			}
			sleep(DRAIN_POLL_INTERVAL).await;
		}
		tracing::debug!("shutdown complete");

		Ok(())
	}

	/// Handle for sending to connections from outside a handler.
	pub fn handle(&self) -> ServerHandle {
		self.shared.server.clone()
	}

	pub fn config(&self) -> &ServerConfig {
		&self.shared.config
	}

	/// Bound address, once started.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.local_addr
	}

	/// Bound port, once started. Useful with port 0.
	pub fn port(&self) -> Option<u16> {
		self.local_addr.map(|a| a.port())
	}

	/// `ws://` url clients can dial (available after start).
	pub fn url(&self) -> Option<String> {
		self.local_addr.map(|a| format!("ws://{}", a))
	}

	/// Connections currently being served, including plain HTTP ones.
	pub fn active_connections(&self) -> usize {
		self.active_connections.load(Ordering::SeqCst)
	}

	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}
}

struct AcceptLoop {
	listener: TcpListener,
	shared: Arc<Shared>,
	shutdown_rx: watch::Receiver<bool>,
	running: Arc<AtomicBool>,
	active: Arc<AtomicUsize>,
	slots: Arc<Semaphore>,
}

impl AcceptLoop {
	async fn run(mut self) {
		loop {
			tokio::select! {
				biased;

				changed = self.shutdown_rx.changed() => {
					if changed.is_err() || *self.shutdown_rx.borrow() {
						break;
					}
				}

				accepted = self.listener.accept() => match accepted {
					Ok((stream, peer)) => self.dispatch(stream, peer),
					Err(e) => tracing::warn!("accept failed: {}", e),
				},
			}
		}

		self.running.store(false, Ordering::SeqCst);
		tracing::info!("stopped accepting on {:?}", self.listener.local_addr().ok());
	}

	fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
		let Ok(slot) = self.slots.clone().try_acquire_owned() else {
			tracing::warn!("{} connections open, turning away {}", self.shared.config.max_connections, peer);
			return;
		};

		self.active.fetch_add(1, Ordering::SeqCst);
		let shared = self.shared.clone();
		let shutdown_rx = self.shutdown_rx.clone();
		let active = self.active.clone();

		spawn(async move {
			handle_connection(stream, peer, shared, shutdown_rx).await;
			active.fetch_sub(1, Ordering::SeqCst);
			drop(slot);
		});
	}
}

impl Drop for WsServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(true);
		}
	}
}
