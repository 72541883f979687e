// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Sends one greeting to ws://localhost:9000 and prints the reply.

use std::io;

use echocast_client::{ClientConfig, run_hello};
use echocast_tracing::TracingBuilder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	TracingBuilder::new().with_console(true).init();

	run_hello(ClientConfig::default(), &mut io::stdout()).await?;

	Ok(())
}
