// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Prints every message ws://localhost:9000 pushes until it hangs up.

use std::io;

use echocast_client::{ClientConfig, run_listen};
use echocast_tracing::TracingBuilder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	TracingBuilder::new().with_console(true).init();

	run_listen(ClientConfig::default(), &mut io::stdout()).await?;

	Ok(())
}
