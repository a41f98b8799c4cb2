use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use hugrelay::store::MemoryStore;
use hugrelay::{AppState, app};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_relay() -> (String, oneshot::Sender<()>) {
    let state = AppState::load(Arc::new(MemoryStore::new())).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay");
    let addr = listener.local_addr().expect("relay addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server = axum::serve(listener, app(state)).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    (addr.to_string(), shutdown_tx)
}

async fn connect(addr: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.expect("connect");
    ws
}

async fn emit(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({"event": event, "data": data}).to_string();
    ws.send(Message::Text(frame)).await.expect("send frame");
}

async fn next_event(ws: &mut Client) -> (String, Value) {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("socket error");
        if let Message::Text(text) = frame {
            let mut value: Value = serde_json::from_str(&text).expect("json frame");
            let name = value["event"].as_str().expect("event name").to_owned();
            return (name, value["data"].take());
        }
    }
}

/// Skips events until `name` shows up.
async fn expect_event(ws: &mut Client, name: &str) -> Value {
    loop {
        let (event, data) = next_event(ws).await;
        if event == name {
            return data;
        }
    }
}

#[tokio::test]
async fn alice_and_bob_chat_end_to_end() {
    let (addr, shutdown) = start_relay().await;

    let mut alice = connect(&addr).await;
    emit(&mut alice, "introduce", json!({"userId": "alice", "name": "Alice", "password": "pw"})).await;
    assert_eq!(next_event(&mut alice).await, ("presence_update".into(), json!({"id": "alice", "online": true})));
    assert_eq!(next_event(&mut alice).await, ("presence_init".into(), json!(["alice"])));
    assert_eq!(next_event(&mut alice).await, ("introduce_result".into(), json!({"ok": true})));

    let mut bob = connect(&addr).await;
    emit(&mut bob, "introduce", json!({"userId": "bob", "name": "Bob"})).await;
    assert_eq!(expect_event(&mut bob, "introduce_result").await, json!({"ok": true}));
    assert_eq!(expect_event(&mut alice, "presence_init").await, json!(["alice", "bob"]));

    let sent = json!({
        "fromId": "bob",
        "fromName": "Bob",
        "toId": "alice",
        "type": "direct",
        "text": "hi alice",
        "ts": 1_700_000_000_000i64
    });
    emit(&mut bob, "send_message", sent.clone()).await;

    let at_alice = expect_event(&mut alice, "message").await;
    let at_bob = expect_event(&mut bob, "message").await;
    assert_eq!(at_alice, at_bob);
    for (field, value) in sent.as_object().unwrap() {
        assert_eq!(&at_alice[field], value, "field {field}");
    }
    assert!(at_alice.get("deleted").is_none());

    bob.close(None).await.expect("close bob");
    let offline = expect_event(&mut alice, "presence_update").await;
    assert_eq!(offline["id"], "bob");
    assert_eq!(offline["online"], false);
    assert!(offline["lastSeen"].as_i64().unwrap() > 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn duplicate_account_is_refused_over_the_wire() {
    let (addr, shutdown) = start_relay().await;

    let mut first = connect(&addr).await;
    emit(&mut first, "introduce", json!({"userId": "alice", "password": "pw"})).await;
    assert_eq!(expect_event(&mut first, "introduce_result").await, json!({"ok": true}));

    let mut second = connect(&addr).await;
    emit(&mut second, "garbage", json!({})).await;
    emit(&mut second, "introduce", json!({"userId": "alice", "password": "other"})).await;
    assert_eq!(
        next_event(&mut second).await,
        ("introduce_result".into(), json!({"ok": false, "reason": "exists"}))
    );

    emit(&mut second, "check_user_exists", json!({"targetId": "alice", "sourceId": "bob"})).await;
    assert_eq!(expect_event(&mut second, "user_exists_result").await, json!(true));
    assert_eq!(expect_event(&mut first, "contact_added").await, json!({"id": "bob", "name": null}));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_reports_connections() {
    let (addr, shutdown) = start_relay().await;
    let mut alice = connect(&addr).await;
    emit(&mut alice, "introduce", json!({"userId": "alice"})).await;
    expect_event(&mut alice, "introduce_result").await;

    let mut http = TcpStream::connect(&addr).await.expect("http connect");
    http.write_all(b"GET /health HTTP/1.1\r\nHost: relay\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");
    let mut response = String::new();
    http.read_to_string(&mut response).await.expect("read response");

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#""status":"ok""#));
    assert!(response.contains(r#""online":1"#));

    let _ = shutdown.send(());
}
