// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Log output for echocast binaries.
//!
//! All output goes to stderr, so stdout stays reserved for program output.

pub mod builder;

pub use builder::{Format, TracingBuilder, TracingError};
pub use tracing::level_filters::LevelFilter;
