// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared data model for echocast clients and servers.
//!
//! A [`Payload`] is the content of a single WebSocket data message. Control
//! frames (ping, pong, close) never surface as payloads.

pub mod payload;

pub use payload::Payload;
