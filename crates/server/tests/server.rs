// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use echocast_server::{
	Broadcast, ConnectionId, Echo, Error, Handler, HttpRequest, HttpResponse, Payload, ServerHandle, WsServer,
};
use echocast_testing::{Event, Recorder, spawn_echo, spawn_server, test_config, wait_for};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::TcpStream,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};

async fn http_exchange(server: &WsServer, request: &str) -> String {
	let mut stream = TcpStream::connect(server.local_addr().unwrap()).await.unwrap();
	stream.write_all(request.as_bytes()).await.unwrap();

	let mut response = Vec::new();
	stream.read_to_end(&mut response).await.unwrap();
	String::from_utf8(response).unwrap()
}

async fn next_text<S>(stream: &mut S) -> String
where
	S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
	loop {
		match stream.next().await.expect("stream ended").expect("read failed") {
			Message::Text(text) => return text.as_str().to_string(),
			Message::Ping(_) | Message::Pong(_) => continue,
			other => panic!("unexpected message: {:?}", other),
		}
	}
}

#[tokio::test]
async fn test_echo_replies_to_sender() {
	let server = spawn_echo().await;
	let (mut ws, _) = connect_async(server.url().unwrap()).await.unwrap();

	ws.send(Message::text("Hello, world!")).await.unwrap();
	assert_eq!(next_text(&mut ws).await, "Hello, world!");
}

#[tokio::test]
async fn test_handshake_carries_user_agent() {
	let server = spawn_echo().await;
	let (_ws, response) = connect_async(server.url().unwrap()).await.unwrap();

	assert_eq!(response.headers().get("server").unwrap(), "echocast-test");
}

#[tokio::test]
async fn test_events_are_ordered_per_connection() {
	let (recorder, mut events) = Recorder::wrap(Echo);
	let server = spawn_server(test_config(), recorder).await;
	let (mut ws, _) = connect_async(server.url().unwrap()).await.unwrap();

	ws.send(Message::text("one")).await.unwrap();
	ws.send(Message::binary(vec![2u8])).await.unwrap();
	assert_eq!(next_text(&mut ws).await, "one");
	ws.close(None).await.unwrap();

	let id = match events.next().await {
		Event::Open(id) => id,
		other => panic!("expected open, got {:?}", other),
	};
	assert_eq!(events.next().await, Event::Message(id, Payload::from("one")));
	assert_eq!(events.next().await, Event::Message(id, Payload::from(vec![2u8])));
	assert_eq!(events.next().await, Event::Close(id));
}

#[tokio::test]
async fn test_broadcast_preset_relays_to_everyone() {
	let server = spawn_server(test_config(), Broadcast).await;
	let url = server.url().unwrap();

	let (mut alice, _) = connect_async(&url).await.unwrap();
	let (mut bob, _) = connect_async(&url).await.unwrap();
	wait_for(|| server.handle().len() == 2, "both clients should be registered").await;

	alice.send(Message::text("hi all")).await.unwrap();

	assert_eq!(next_text(&mut alice).await, "hi all");
	assert_eq!(next_text(&mut bob).await, "hi all");
}

#[tokio::test]
async fn test_send_to_closed_connection_fails() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let (mut ws, _) = connect_async(server.url().unwrap()).await.unwrap();

	let id = events.opened().await;
	ws.close(None).await.unwrap();
	assert_eq!(events.next().await, Event::Close(id));

	let err = server.handle().send(id, "too late").unwrap_err();
	assert!(matches!(err, Error::UnknownConnection(unknown) if unknown == id));
	assert_eq!(err.to_string(), format!("unknown connection {}", id));
}

#[tokio::test]
async fn test_close_writes_queued_messages_first() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let (mut ws, _) = connect_async(server.url().unwrap()).await.unwrap();

	let id = events.opened().await;
	server.handle().send(id, "one").unwrap();
	server.handle().send(id, "two").unwrap();
	server.handle().close(id).unwrap();
	assert!(!server.handle().is_open(id));

	assert_eq!(next_text(&mut ws).await, "one");
	assert_eq!(next_text(&mut ws).await, "two");
	match ws.next().await {
		Some(Ok(Message::Close(_))) => {}
		other => panic!("expected close, got {:?}", other),
	}
	assert_eq!(events.next().await, Event::Close(id));
}

#[tokio::test]
async fn test_plain_http_gets_not_found_by_default() {
	let server = spawn_echo().await;

	let response = http_exchange(&server, "GET /status HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

	assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{}", response);
	assert!(response.contains("Server: echocast-test\r\n"));
	assert!(response.ends_with("Not Found"));
}

struct Status;

impl Handler for Status {
	fn on_http(&self, server: &ServerHandle, _connection: ConnectionId, request: &HttpRequest) -> HttpResponse {
		match (request.method.as_str(), request.resource.as_str()) {
			("GET", "/status") => HttpResponse::ok(format!("{} open", server.len())),
			("POST", "/echo") => HttpResponse::ok(request.body.clone()),
			_ => HttpResponse::new(400, "bad request"),
		}
	}
}

#[tokio::test]
async fn test_plain_http_is_routed_to_handler() {
	let server = spawn_server(test_config(), Status).await;

	let response = http_exchange(&server, "GET /status HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
	assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{}", response);
	assert!(response.ends_with("\r\n\r\n0 open"));

	let response =
		http_exchange(&server, "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello").await;
	assert!(response.ends_with("\r\n\r\nhello"), "{}", response);

	let response = http_exchange(&server, "DELETE / HTTP/1.1\r\n\r\n").await;
	assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", response);
}

#[tokio::test]
async fn test_request_head_split_across_writes() {
	let server = spawn_server(test_config(), Status).await;
	let mut stream = TcpStream::connect(server.local_addr().unwrap()).await.unwrap();

	stream.write_all(b"GET /sta").await.unwrap();
	tokio::time::sleep(Duration::from_millis(50)).await;
	stream.write_all(b"tus HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

	let mut response = Vec::new();
	stream.read_to_end(&mut response).await.unwrap();
	let response = String::from_utf8(response).unwrap();
	assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{}", response);
}

#[tokio::test]
async fn test_frame_sent_with_upgrade_request_is_delivered() {
	let server = spawn_echo().await;
	let mut stream = TcpStream::connect(server.local_addr().unwrap()).await.unwrap();

	let mut request = b"GET / HTTP/1.1\r\nHost: localhost\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\
		Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 13\r\n\r\n"
		.to_vec();
	// Masked text frame "hi" with mask 01 02 03 04.
	request.extend_from_slice(&[0x81, 0x82, 0x01, 0x02, 0x03, 0x04, b'h' ^ 0x01, b'i' ^ 0x02]);
	stream.write_all(&request).await.unwrap();

	let mut received = Vec::new();
	let mut chunk = [0u8; 512];
	let head_end = loop {
		let n = stream.read(&mut chunk).await.unwrap();
		assert!(n > 0, "connection closed early");
		received.extend_from_slice(&chunk[..n]);
		if let Some(pos) = received.windows(4).position(|w| w == b"\r\n\r\n") {
			if received.len() >= pos + 4 + 4 {
				break pos + 4;
			}
		}
	};

	let head = String::from_utf8_lossy(&received[..head_end]).to_string();
	assert!(head.starts_with("HTTP/1.1 101 Switching Protocols\r\n"), "{}", head);
	assert!(head.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
	assert_eq!(&received[head_end..head_end + 4], &[0x81, 0x02, b'h', b'i']);
}

#[tokio::test]
async fn test_http_request_is_recorded() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;

	http_exchange(&server, "GET /metrics HTTP/1.1\r\nX-Probe: yes\r\n\r\n").await;

	match events.next().await {
		Event::Http(_, request) => {
			assert_eq!(request.resource, "/metrics");
			assert_eq!(request.header("x-probe"), Some("yes"));
		}
		other => panic!("expected http event, got {:?}", other),
	}
}

#[tokio::test]
async fn test_garbage_request_fails_connection() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;

	let mut stream = TcpStream::connect(server.local_addr().unwrap()).await.unwrap();
	stream.write_all(b"\x00\x01\x02\r\n\r\n").await.unwrap();

	assert!(matches!(events.next().await, Event::Fail(_, _)));
}

#[tokio::test]
async fn test_silent_client_times_out() {
	let (recorder, mut events) = Recorder::new();
	let config = test_config().handshake_timeout(Duration::from_millis(100));
	let server = spawn_server(config, recorder).await;

	let _stream = TcpStream::connect(server.local_addr().unwrap()).await.unwrap();

	match events.next().await {
		Event::Fail(_, reason) => assert!(reason.contains("timed out"), "{}", reason),
		other => panic!("expected fail, got {:?}", other),
	}
}

#[tokio::test]
async fn test_connection_limit_rejects_extra_clients() {
	let server = spawn_server(test_config().max_connections(1), Echo).await;
	let url = server.url().unwrap();

	let (_first, _) = connect_async(&url).await.unwrap();
	wait_for(|| server.active_connections() == 1, "first client should be active").await;

	assert!(connect_async(&url).await.is_err());
	assert_eq!(server.active_connections(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_clients_and_drains() {
	let mut server = spawn_echo().await;
	let (mut ws, _) = connect_async(server.url().unwrap()).await.unwrap();
	wait_for(|| server.active_connections() == 1, "client should be active").await;

	server.shutdown().await.unwrap();

	assert!(!server.is_running());
	assert_eq!(server.active_connections(), 0);
	match ws.next().await {
		Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {}
		other => panic!("expected close, got {:?}", other),
	}
}

#[tokio::test]
async fn test_start_is_idempotent() {
	let mut server = spawn_echo().await;
	let first = server.local_addr().unwrap();

	assert_eq!(server.start().await.unwrap(), first);
	assert!(server.is_running());
	assert_eq!(server.port(), Some(first.port()));
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
	let server = spawn_echo().await;
	let taken = server.local_addr().unwrap().to_string();

	let mut second = WsServer::new(test_config().bind_addr(taken.clone()), Echo);
	match second.start().await {
		Err(Error::Bind {
			addr, ..
		}) => assert_eq!(addr, taken),
		other => panic!("expected bind error, got {:?}", other),
	}
}
