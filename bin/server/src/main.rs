// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Demo server for the echo and broadcast clients.

use clap::{Parser, ValueEnum};
use echocast_server::{Broadcast, Echo, ServerConfig, WsServer};
use echocast_tracing::{LevelFilter, TracingBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
	/// Send every message back to its sender
	Echo,
	/// Relay every message to all connected clients
	Broadcast,
}

/// echocast WebSocket server
#[derive(Parser, Debug)]
#[command(name = "echocast-server")]
#[command(about = "Serve echo or broadcast WebSocket sessions", long_about = None)]
struct Args {
	/// Address to listen on
	#[arg(short, long, default_value = "127.0.0.1:9000")]
	bind: String,

	/// How incoming messages are answered
	#[arg(short, long, value_enum, default_value_t = Mode::Echo)]
	mode: Mode,

	/// Maximum number of concurrent connections
	#[arg(long, default_value_t = 1024)]
	max_connections: usize,

	/// Value of the Server response header
	#[arg(long)]
	user_agent: Option<String>,

	/// Log connection events
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn config(&self) -> ServerConfig {
		let config = ServerConfig::new().bind_addr(self.bind.clone()).max_connections(self.max_connections);
		match &self.user_agent {
			Some(user_agent) => config.user_agent(user_agent.clone()),
			None => config,
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let level = if args.verbose {
		LevelFilter::DEBUG
	} else {
		LevelFilter::INFO
	};
	TracingBuilder::new().with_console(true).level(level).init();

	let mut server = match args.mode {
		Mode::Echo => WsServer::new(args.config(), Echo),
		Mode::Broadcast => WsServer::new(args.config(), Broadcast),
	};

	let addr = server.start().await?;
	tracing::info!("serving {:?} sessions on ws://{}", args.mode, addr);
	println!("Press Ctrl+C to stop...");

	tokio::signal::ctrl_c().await?;

	server.shutdown().await?;
	println!("Server stopped");

	Ok(())
}
