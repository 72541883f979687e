// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared helpers for echocast integration tests.

pub mod network;
pub mod recorder;
pub mod server;
pub mod util;

pub use network::{free_local_socket, unreachable_url};
pub use recorder::{Event, Events, Recorder};
pub use server::{spawn_broadcast, spawn_echo, spawn_server, test_config};
pub use util::wait::{wait_for, wait_for_condition};
