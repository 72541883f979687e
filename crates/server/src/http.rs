// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Plain HTTP support.
//!
//! Every accepted socket starts with an HTTP request. Upgrade requests are
//! answered with `101 Switching Protocols` and the socket is handed to
//! tungstenite; anything else is answered through
//! [`Handler::on_http`](crate::Handler::on_http) and closed.

use std::io;

use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::TcpStream,
};
use tokio_tungstenite::tungstenite::{handshake::derive_accept_key, http::StatusCode};

const MAX_HEADERS: usize = 64;
const MAX_HEAD_SIZE: usize = 8 * 1024;

/// A plain HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub method: String,
	/// Path and query string, as sent by the client.
	pub resource: String,
	pub headers: Vec<(String, String)>,
	pub body: String,
}

impl HttpRequest {
	/// First value of the named header, compared case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
	}
}

/// Response to a plain HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub content_type: String,
	pub body: String,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self {
			status,
			content_type: "text/plain; charset=utf-8".to_string(),
			body: body.into(),
		}
	}

	pub fn ok(body: impl Into<String>) -> Self {
		Self::new(200, body)
	}

	pub fn not_found() -> Self {
		Self::new(404, "Not Found")
	}

	pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();
		self
	}

	fn reason(&self) -> &'static str {
		StatusCode::from_u16(self.status).ok().and_then(|status| status.canonical_reason()).unwrap_or("Unknown")
	}

	/// Serialize status line, headers and body.
	pub(crate) fn to_bytes(&self, server: &str) -> Vec<u8> {
		let head = format!(
			"HTTP/1.1 {} {}\r\nServer: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
			self.status,
			self.reason(),
			server,
			self.content_type,
			self.body.len()
		);
		let mut bytes = head.into_bytes();
		bytes.extend_from_slice(self.body.as_bytes());
		bytes
	}
}

/// What the client opened the connection with.
#[derive(Debug)]
pub(crate) enum Opening {
	/// A valid upgrade request. `leftover` holds bytes the client sent after
	/// the request head.
	WebSocket {
		accept: String,
		leftover: Vec<u8>,
	},
	Http(HttpRequest),
}

/// Read the request head, and the body of a plain HTTP request.
pub(crate) async fn read_opening(stream: &mut TcpStream, max_body: usize) -> io::Result<Opening> {
	let mut buf = Vec::with_capacity(1024);

	loop {
		if stream.read_buf(&mut buf).await? == 0 {
			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before request"));
		}

		match parse_head(&buf)? {
			None if buf.len() >= MAX_HEAD_SIZE => return Err(invalid_data("request head too large".to_string())),
			None => continue,
			Some(Head::Upgrade {
				head_len,
				accept,
			}) => {
				let leftover = buf.split_off(head_len);
				return Ok(Opening::WebSocket {
					accept,
					leftover,
				});
			}
			Some(Head::Plain {
				head_len,
				content_length,
				mut request,
			}) => {
				if content_length > max_body {
					return Err(invalid_data(format!(
						"request body of {} bytes exceeds limit of {}",
						content_length, max_body
					)));
				}

				let mut body = buf.split_off(head_len);
				let received = body.len().min(content_length);
				body.resize(content_length, 0);
				stream.read_exact(&mut body[received..]).await?;
				request.body = String::from_utf8_lossy(&body).into_owned();

				return Ok(Opening::Http(request));
			}
		}
	}
}

pub(crate) async fn write_response(stream: &mut TcpStream, response: &HttpResponse, server: &str) -> io::Result<()> {
	stream.write_all(&response.to_bytes(server)).await?;
	stream.shutdown().await
}

/// The `101 Switching Protocols` answer to a valid upgrade request.
pub(crate) fn upgrade_response(accept: &str, server: &str) -> Vec<u8> {
	format!(
		"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {}\r\nServer: {}\r\n\r\n",
		accept, server
	)
	.into_bytes()
}

#[derive(Debug)]
enum Head {
	Upgrade {
		head_len: usize,
		accept: String,
	},
	Plain {
		head_len: usize,
		content_length: usize,
		request: HttpRequest,
	},
}

/// `Ok(None)` while the head is still incomplete.
fn parse_head(bytes: &[u8]) -> io::Result<Option<Head>> {
	let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
	let mut parsed = httparse::Request::new(&mut headers);

	let head_len = match parsed.parse(bytes).map_err(|e| invalid_data(format!("malformed request: {}", e)))? {
		httparse::Status::Complete(len) => len,
		httparse::Status::Partial => return Ok(None),
	};

	let headers: Vec<(String, String)> = parsed
		.headers
		.iter()
		.map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).trim().to_string()))
		.collect();
	let header = |name: &str| headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str());
	let lists = |name: &str, token: &str| {
		header(name).is_some_and(|value| value.split(',').any(|v| v.trim().eq_ignore_ascii_case(token)))
	};

	if lists("upgrade", "websocket") {
		if parsed.method != Some("GET") || parsed.version != Some(1) {
			return Err(invalid_data("upgrade requires GET over HTTP/1.1".to_string()));
		}
		if !lists("connection", "upgrade") || header("sec-websocket-version") != Some("13") {
			return Err(invalid_data("missing or invalid WebSocket upgrade headers".to_string()));
		}
		let key = header("sec-websocket-key").ok_or_else(|| invalid_data("missing Sec-WebSocket-Key".to_string()))?;

		return Ok(Some(Head::Upgrade {
			head_len,
			accept: derive_accept_key(key.as_bytes()),
		}));
	}

	let content_length = match header("content-length") {
		Some(value) => value.parse::<usize>().map_err(|_| invalid_data(format!("bad content-length '{}'", value)))?,
		None => 0,
	};

	Ok(Some(Head::Plain {
		head_len,
		content_length,
		request: HttpRequest {
			method: parsed.method.unwrap_or("GET").to_string(),
			resource: parsed.path.unwrap_or("/").to_string(),
			headers,
			body: String::new(),
		},
	}))
}

fn invalid_data(message: String) -> io::Error {
	io::Error::new(io::ErrorKind::InvalidData, message)
}
