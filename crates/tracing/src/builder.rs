// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builder pattern for configuring the tracing subscriber

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::ParseError};

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
	#[error("invalid log filter: {0}")]
	InvalidFilter(#[from] ParseError),

	#[error("failed to install subscriber: {0}")]
	Install(String),
}

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// Human readable, one event per line.
	Console,
	/// One JSON object per line.
	Json,
}

/// Builder for configuring the global tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: LevelFilter,
	filter: Option<String>,
	format: Format,
	color: bool,
	with_target: bool,
}

impl TracingBuilder {
	/// Create a new tracing builder with default settings
	pub fn new() -> Self {
		Self {
			level: LevelFilter::WARN,
			filter: None,
			format: Format::Console,
			color: true,
			with_target: false,
		}
	}

	/// Level used when neither an explicit filter nor `RUST_LOG` is set.
	pub fn level(mut self, level: LevelFilter) -> Self {
		self.level = level;
		self
	}

	/// Explicit filter directives, e.g. `"echocast_server=debug,info"`.
	/// Takes precedence over `RUST_LOG`.
	pub fn filter(mut self, directives: impl Into<String>) -> Self {
		self.filter = Some(directives.into());
		self
	}

	/// Human readable output
	pub fn with_console(mut self, color: bool) -> Self {
		self.format = Format::Console;
		self.color = color;
		self
	}

	/// JSON output
	pub fn with_json(mut self) -> Self {
		self.format = Format::Json;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	pub fn format(&self) -> Format {
		self.format
	}

	pub(crate) fn env_filter(&self) -> Result<EnvFilter, TracingError> {
		match &self.filter {
			Some(directives) => Ok(EnvFilter::try_new(directives)?),
			None => Ok(EnvFilter::builder().with_default_directive(self.level.into()).from_env_lossy()),
		}
	}

	/// Install the subscriber for the whole process.
	///
	/// Fails if a global subscriber is already installed.
	pub fn try_init(self) -> Result<(), TracingError> {
		let filter = self.env_filter()?;
		let builder = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(io::stderr)
			.with_target(self.with_target);

		let result = match self.format {
			Format::Console => builder.with_ansi(self.color).try_init(),
			Format::Json => builder.json().with_ansi(false).try_init(),
		};
		result.map_err(|e| TracingError::Install(e.to_string()))
	}

	/// Like [`try_init`](Self::try_init), ignoring an already installed
	/// subscriber.
	pub fn init(self) {
		if let Err(e) = self.try_init() {
			eprintln!("{}", e);
		}
	}
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}
