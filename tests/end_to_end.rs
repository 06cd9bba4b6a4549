//! End-to-end tests against a real listener on an ephemeral port.

use bytes::Bytes;
use framekv::client::Client;
use framekv::connection::ConnectionStats;
use framekv::protocol::{encode_frame, Payload, Response};
use framekv::server::Server;
use framekv::storage::StorageEngine;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start_server() -> (Client, Arc<StorageEngine>, Arc<ConnectionStats>) {
    let storage = Arc::new(StorageEngine::new());
    let server = Server::bind("127.0.0.1:0", Arc::clone(&storage))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let stats = server.stats();

    tokio::spawn(server.run());

    (Client::new(addr.to_string()), storage, stats)
}

#[tokio::test]
async fn test_read_of_missing_key() {
    let (client, storage, _) = start_server().await;

    let reply = client
        .send_raw(&encode_frame(&Payload::set("hello", "").to_bytes()).unwrap())
        .await
        .unwrap();

    assert_eq!(&reply[..], b"[NOK] : Key not found in DB.");
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_write_then_read_on_a_new_connection() {
    let (client, _, stats) = start_server().await;

    let reply = client
        .send_raw(&encode_frame(&Payload::set("a", "b").to_bytes()).unwrap())
        .await
        .unwrap();
    assert_eq!(&reply[..], b"[OK] : Operation completed.");

    let reply = client
        .send_raw(&encode_frame(&Payload::set("a", "").to_bytes()).unwrap())
        .await
        .unwrap();
    assert_eq!(&reply[..], b"b");

    assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn test_truncated_body_is_rejected() {
    let (client, storage, stats) = start_server().await;

    // Header promises 100 bytes, only 10 arrive before the client closes
    let mut frame = b"00000100".to_vec();
    frame.extend_from_slice(&Payload::set("key", "val").to_bytes()[..10]);

    let reply = client.send_raw(&frame).await.unwrap();

    assert_eq!(&reply[..], b"[NOK] : wrong number of bytes received");
    assert!(storage.is_empty());
    assert_eq!(storage.stats().set_ops, 0);
    assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_last_write_wins() {
    let (client, _, _) = start_server().await;

    for value in ["v1", "v2", "v3"] {
        assert_eq!(client.set("k", value).await.unwrap(), Response::ok());
    }

    assert_eq!(
        client.get("k").await.unwrap(),
        Response::message(Bytes::from("v3"))
    );
}

#[tokio::test]
async fn test_binary_key_and_value() {
    let (client, storage, _) = start_server().await;

    let key = Bytes::from_static(&[0x00, 0xFF, 0x10]);
    let value = Bytes::from_static(&[0xC3, 0x28, 0x00, 0x7F]);

    assert_eq!(
        client.set(key.clone(), value.clone()).await.unwrap(),
        Response::ok()
    );
    assert_eq!(storage.get(&key), Some(value.clone()));
    assert_eq!(client.get(key).await.unwrap(), Response::message(value));
}

#[tokio::test]
async fn test_listener_survives_bad_clients() {
    let (client, _, stats) = start_server().await;

    // Garbage header
    let reply = client.send_raw(b"nothead!").await.unwrap();
    assert!(reply.starts_with(b"[NOK] : "));

    // Connect and vanish without sending anything
    drop(TcpStream::connect(client.addr()).await.unwrap());

    // Short header
    let reply = client.send_raw(b"0001").await.unwrap();
    assert_eq!(&reply[..], b"[NOK] : wrong number of bytes received");

    // The listener is still serving
    assert_eq!(client.set("alive", "yes").await.unwrap(), Response::ok());
    assert!(stats.protocol_errors.load(Ordering::Relaxed) >= 2);
}

#[tokio::test]
async fn test_one_request_per_connection() {
    let (client, storage, _) = start_server().await;

    let mut stream = TcpStream::connect(client.addr()).await.unwrap();
    let first = encode_frame(&Payload::set("first", "1").to_bytes()).unwrap();
    stream.write_all(&first).await.unwrap();

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    assert_eq!(&reply[..], b"[OK] : Operation completed.");

    // The server has closed its side; nothing more will be served here
    let second = encode_frame(&Payload::set("second", "2").to_bytes()).unwrap();
    let _ = stream.write_all(&second).await;
    let mut rest = Vec::new();
    let _ = stream.read_to_end(&mut rest).await;
    assert!(rest.is_empty());

    assert_eq!(storage.get(&Bytes::from("first")), Some(Bytes::from("1")));
    assert_eq!(storage.get(&Bytes::from("second")), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_same_key() {
    let (client, storage, _) = start_server().await;

    let values: Vec<Bytes> = (0..32u8)
        .map(|i| Bytes::from(vec![b'A' + (i % 26); 8 * 1024 + i as usize]))
        .collect();

    let mut tasks = Vec::new();
    for value in values.iter().cloned() {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                assert_eq!(
                    client.set("shared", value.clone()).await.unwrap(),
                    Response::ok()
                );
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let sent: HashSet<Bytes> = values.into_iter().collect();
    let stored = storage.get(&Bytes::from("shared")).unwrap();
    assert!(sent.contains(&stored));

    match client.get("shared").await.unwrap() {
        Response::Message(value) => assert_eq!(value, stored),
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_distinct_keys() {
    let (client, storage, stats) = start_server().await;

    let mut tasks = Vec::new();
    for i in 0..64 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let key = format!("key-{}", i);
            let value = format!("value-{}", i);
            assert_eq!(client.set(key.clone(), value.clone()).await.unwrap(), Response::ok());
            assert_eq!(
                client.get(key).await.unwrap(),
                Response::message(Bytes::from(value))
            );
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(storage.len(), 64);
    assert_eq!(stats.requests_processed.load(Ordering::Relaxed), 128);
}
