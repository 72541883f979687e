// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The two client sessions: a single echo round trip and a receive loop.
//!
//! Both write human-readable lines to `out`, one line per message, flushed
//! as soon as the line is complete.

use std::io::Write;

use tracing::debug;

use crate::{
	client::WsClient,
	config::ClientConfig,
	error::{Error, Result},
};

/// Message the echo session sends.
pub const GREETING: &str = "Hello, world!";

/// Send [`GREETING`], then print the first reply.
///
/// Output:
///
/// ```text
/// Sending: Hello, world!
/// Received: Hello, world!
/// ```
pub async fn hello<W: Write>(client: &mut WsClient, out: &mut W) -> Result<()> {
	writeln!(out, "Sending: {}", GREETING)?;
	out.flush()?;

	client.send(GREETING).await?;

	let reply = client.recv().await?.ok_or(Error::ConnectionClosed)?;
	writeln!(out, "Received: {}", reply)?;
	out.flush()?;

	Ok(())
}

/// Print every message the server pushes until it closes the connection.
///
/// Returns the number of messages received.
pub async fn listen<W: Write>(client: &mut WsClient, out: &mut W) -> Result<usize> {
	let mut received = 0;

	while let Some(payload) = client.recv().await? {
		writeln!(out, "Received: {}", payload)?;
		out.flush()?;
		received += 1;
	}

	debug!("{} closed after {} messages", client.url(), received);
	Ok(received)
}

/// Connect, run [`hello`], close. Nothing is written if the connection
/// cannot be established.
pub async fn run_hello<W: Write>(config: ClientConfig, out: &mut W) -> Result<()> {
	let mut client = WsClient::connect_with(config).await?;
	hello(&mut client, out).await?;
	client.close().await
}

/// Connect, run [`listen`] until the server closes the connection.
pub async fn run_listen<W: Write>(config: ClientConfig, out: &mut W) -> Result<usize> {
	let mut client = WsClient::connect_with(config).await?;
	let received = listen(&mut client, out).await?;
	client.close().await?;
	Ok(received)
}
