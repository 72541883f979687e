// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use echocast_client::{ClientConfig, Error, WsClient, hello, listen, run_hello, run_listen};
use echocast_testing::{Recorder, spawn_echo, spawn_server, test_config, unreachable_url};

fn output(bytes: Vec<u8>) -> String {
	String::from_utf8(bytes).expect("output is utf-8")
}

#[tokio::test]
async fn test_hello_prints_greeting_and_echo() {
	let server = spawn_echo().await;
	let mut client = WsClient::connect(&server.url().unwrap()).await.unwrap();

	let mut out = Vec::new();
	hello(&mut client, &mut out).await.unwrap();

	assert_eq!(output(out), "Sending: Hello, world!\nReceived: Hello, world!\n");
	client.close().await.unwrap();
}

#[tokio::test]
async fn test_run_hello_against_echo_server() {
	let server = spawn_echo().await;

	let mut out = Vec::new();
	run_hello(ClientConfig::new().url(server.url().unwrap()), &mut out).await.unwrap();

	assert_eq!(output(out), "Sending: Hello, world!\nReceived: Hello, world!\n");
}

#[tokio::test]
async fn test_hello_fails_when_server_closes_without_reply() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let mut client = WsClient::connect(&server.url().unwrap()).await.unwrap();

	let id = events.opened().await;
	server.handle().close(id).unwrap();

	let mut out = Vec::new();
	let err = hello(&mut client, &mut out).await.unwrap_err();
	assert!(err.is_disconnect(), "unexpected error: {}", err);
	assert!(output(out).starts_with("Sending: Hello, world!\n"));
}

#[tokio::test]
async fn test_listen_prints_pushed_messages_in_order() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let mut client = WsClient::connect(&server.url().unwrap()).await.unwrap();

	let id = events.opened().await;
	let handle = server.handle();
	for payload in ["A", "B", "C"] {
		handle.send(id, payload).unwrap();
	}
	handle.close(id).unwrap();

	let mut out = Vec::new();
	let received = listen(&mut client, &mut out).await.unwrap();

	assert_eq!(received, 3);
	assert_eq!(output(out), "Received: A\nReceived: B\nReceived: C\n");
}

#[tokio::test]
async fn test_listen_keeps_receiving_until_close() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let url = server.url().unwrap();

	let listener = tokio::spawn(async move {
		let mut out = Vec::new();
		let received = run_listen(ClientConfig::new().url(url), &mut out).await.unwrap();
		(received, output(out))
	});

	let id = events.opened().await;
	let handle = server.handle();
	for i in 0..5 {
		handle.send(id, format!("tick {}", i)).unwrap();
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
	}
	assert!(!listener.is_finished());
	handle.close(id).unwrap();

	let (received, out) = listener.await.unwrap();
	assert_eq!(received, 5);
	assert_eq!(out.lines().collect::<Vec<_>>(), vec![
		"Received: tick 0",
		"Received: tick 1",
		"Received: tick 2",
		"Received: tick 3",
		"Received: tick 4",
	]);
}

#[tokio::test]
async fn test_listen_receives_broadcasts() {
	let (recorder, mut events) = Recorder::new();
	let server = spawn_server(test_config(), recorder).await;
	let url = server.url().unwrap();

	let mut first = WsClient::connect(&url).await.unwrap();
	let mut second = WsClient::connect(&url).await.unwrap();
	events.opened().await;
	events.opened().await;

	assert_eq!(server.handle().broadcast("news"), 2);

	assert_eq!(first.recv().await.unwrap().unwrap().to_string(), "news");
	assert_eq!(second.recv().await.unwrap().unwrap().to_string(), "news");
}

#[tokio::test]
async fn test_unreachable_server_fails_without_output() {
	let mut out = Vec::new();
	let err = run_hello(ClientConfig::new().url(unreachable_url()), &mut out).await.unwrap_err();
	assert!(matches!(err, Error::Connect { .. }), "unexpected error: {}", err);
	assert!(out.is_empty());

	let mut out = Vec::new();
	let err = run_listen(ClientConfig::new().url(unreachable_url()), &mut out).await.unwrap_err();
	assert!(matches!(err, Error::Connect { .. }), "unexpected error: {}", err);
	assert!(out.is_empty());
}
