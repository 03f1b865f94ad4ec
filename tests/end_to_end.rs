//! End-to-end forwarding tests through real sockets.

use std::time::Duration;

use futures_util::future::join_all;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn test_ping_is_echoed_byte_for_byte() {
    let (p1, _b1) = common::start_echo_backend().await;
    let (p2, _b2) = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::test_config(&[p1, p2], 1000)).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(b"PING").await.unwrap();

    let mut reply = [0u8; 4];
    tokio::time::timeout(Duration::from_secs(2), client.read_exact(&mut reply))
        .await
        .expect("no echo within 2s")
        .unwrap();
    assert_eq!(&reply, b"PING");
}

#[tokio::test]
async fn test_large_payload_preserves_order() {
    let (port, _backend) = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::test_config(&[port], 1000)).await;

    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
    let client = TcpStream::connect(proxy.addr).await.unwrap();
    let (mut rd, mut wr) = client.into_split();

    let to_send = payload.clone();
    let writer = tokio::spawn(async move {
        wr.write_all(&to_send).await.unwrap();
        // half-close: the backend sees EOF, finishes echoing, and closes
        wr.shutdown().await.unwrap();
    });

    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), rd.read_to_end(&mut received))
        .await
        .expect("session did not finish")
        .unwrap();
    writer.await.unwrap();

    assert_eq!(received.len(), payload.len());
    assert!(received == payload, "bytes were altered or reordered");
}

#[tokio::test]
async fn test_total_outage_closes_client_quickly() {
    let p1 = common::refused_port().await;
    let p2 = common::refused_port().await;
    let proxy = common::start_proxy(common::test_config(&[p1, p2], 200)).await;

    assert!(
        common::wait_until(Duration::from_secs(2), || proxy.registry.live_count() == 0).await,
        "health sweep should take both backends down"
    );

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_millis(200), client.read(&mut buf))
        .await
        .expect("client was left hanging");
    // EOF or reset, never data
    assert_eq!(read.unwrap_or(0), 0);
    assert_eq!(proxy.registry.current_load(p1), Some(0));
    assert_eq!(proxy.registry.current_load(p2), Some(0));
}

#[tokio::test]
async fn test_connect_failure_does_not_mark_backend_down() {
    let port = common::refused_port().await;
    let mut config = common::test_config(&[port], 1000);
    config.health_check.enabled = false;
    let proxy = common::start_proxy(config).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
        .await
        .expect("client was left hanging");
    assert_eq!(read.unwrap_or(0), 0);

    // only the health monitor may take a backend out of rotation
    assert!(proxy.registry.is_live(port));
    assert_eq!(proxy.registry.current_load(port), Some(0));
}

#[tokio::test]
async fn test_fifty_sessions_spread_evenly() {
    let (p1, _b1) = common::start_echo_backend().await;
    let (p2, _b2) = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::test_config(&[p1, p2], 1000)).await;

    // open sessions one at a time so each routing decision sees the previous
    // session's load
    let mut clients = Vec::new();
    for i in 0..50u8 {
        let mut client = TcpStream::connect(proxy.addr).await.unwrap();
        client.write_all(&[i]).await.unwrap();
        let mut reply = [0u8; 1];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply[0], i);
        clients.push(client);

        let l1 = proxy.registry.current_load(p1).unwrap();
        let l2 = proxy.registry.current_load(p2).unwrap();
        assert!(l1.abs_diff(l2) <= 1, "unbalanced after {} sessions: {} vs {}", i + 1, l1, l2);
    }

    assert_eq!(proxy.registry.current_load(p1), Some(25));
    assert_eq!(proxy.registry.current_load(p2), Some(25));
    assert_eq!(proxy.sessions.active_count(), 50);

    // every session is still independently usable
    let checks = clients.iter_mut().enumerate().map(|(i, client)| async move {
        let msg = format!("session-{i}");
        client.write_all(msg.as_bytes()).await.unwrap();
        let mut reply = vec![0u8; msg.len()];
        client.read_exact(&mut reply).await.unwrap();
        reply == msg.as_bytes()
    });
    assert!(join_all(checks).await.into_iter().all(|ok| ok));

    drop(clients);
    assert!(
        common::wait_until(Duration::from_secs(3), || {
            proxy.registry.current_load(p1) == Some(0) && proxy.registry.current_load(p2) == Some(0)
        })
        .await,
        "load not released after clients left"
    );
    assert_eq!(proxy.sessions.active_count(), 0);
}

#[tokio::test]
async fn test_load_released_when_backend_closes() {
    let (port, _backend) = common::start_closing_backend(b"BYE").await;
    let proxy = common::start_proxy(common::test_config(&[port], 1000)).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    let mut reply = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), client.read_to_end(&mut reply))
        .await
        .expect("proxy did not close the client")
        .unwrap();
    assert_eq!(reply, b"BYE");

    assert!(common::wait_until(Duration::from_secs(2), || proxy.registry.current_load(port) == Some(0)).await);
}

#[tokio::test]
async fn test_client_disconnect_releases_load() {
    let (port, _backend) = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::test_config(&[port], 1000)).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(b"hello").await.unwrap();
    let mut reply = [0u8; 5];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(proxy.registry.current_load(port), Some(1));

    drop(client);
    assert!(
        common::wait_until(Duration::from_secs(2), || proxy.registry.current_load(port) == Some(0)).await,
        "load still held after client left"
    );
}

#[tokio::test]
async fn test_accept_loop_stops_on_shutdown() {
    let (port, _backend) = common::start_echo_backend().await;
    let proxy = common::start_proxy(common::test_config(&[port], 1000)).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(b"x").await.unwrap();
    let mut reply = [0u8; 1];
    client.read_exact(&mut reply).await.unwrap();

    proxy.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // new clients are no longer accepted
    assert!(TcpStream::connect(proxy.addr).await.is_err());

    // the session that was already open keeps working
    client.write_all(b"y").await.unwrap();
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(&reply, b"y");
}
