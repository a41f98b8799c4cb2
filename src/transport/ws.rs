use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

use crate::{AppState, ConnectionHub, ConnectionId, Relay, events::Inbound};

#[debug_handler(state = AppState)]
pub async fn connect(
    State(relay): State<Arc<Relay>>,
    State(hub): State<Arc<ConnectionHub>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |stream| serve(stream, relay, hub))
}

fn decode(msg: &Message) -> Option<serde_json::Result<Inbound>> {
    match msg {
        Message::Text(text) => Some(serde_json::from_str(text.as_str())),
        Message::Binary(bytes) => Some(serde_json::from_slice(bytes)),
        _ => None,
    }
}

async fn serve(stream: WebSocket, relay: Arc<Relay>, hub: Arc<ConnectionHub>) {
    let conn = ConnectionId::new();
    let mut outbox = hub.attach(conn);
    let (mut sender, mut receiver) = stream.split();

    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbox.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    relay.connect(conn);

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let msg = match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(msg)) => msg,
                    Some(Err(err)) => {
                        tracing::debug!(%conn, %err, "socket error");
                        break;
                    }
                };
                match decode(&msg) {
                    Some(Ok(event)) => relay.dispatch(conn, event).await,
                    Some(Err(err)) => tracing::debug!(%conn, %err, "undecodable frame ignored"),
                    None => {}
                }
            }
            _ = &mut writer => break,
        }
    }

    hub.detach(conn);
    relay.disconnect(conn).await;
    writer.abort();
}
