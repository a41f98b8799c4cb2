use crate::conversations::MessageKind;
use crate::events::{MessageDeleted, MessageEdited, Outbound, SendMessagePayload};
use crate::now_millis;
use crate::transport::ConnectionId;

use super::Relay;

impl Relay {
    /// Stores a chat message and delivers it. Fire-and-forget: the sender
    /// hears nothing back except its own echo on direct chats.
    pub async fn send(&self, conn: ConnectionId, payload: SendMessagePayload) {
        let Some(message) = payload.into_message(now_millis()) else {
            tracing::debug!(%conn, "message without sender or recipient dropped");
            return;
        };

        let mut conversations = self.conversations.lock().await;
        let key = conversations.append(message.clone());
        self.save_conversations(&conversations).await;

        // delivered under the lock so every recipient sees one conversation
        // in storage order
        let (kind, ts) = (message.kind, message.ts);
        let peer_conns = self.sessions.sessions_for(&message.to_id);
        let event = Outbound::Message(message);
        match kind {
            // not filtered by membership, every connection gets group traffic
            MessageKind::Group => self.transport.broadcast_all(&event),
            MessageKind::Direct => {
                for target in &peer_conns {
                    self.transport.send_to(*target, &event);
                }
                if !peer_conns.contains(&conn) {
                    self.transport.send_to(conn, &event);
                }
            }
        }
        tracing::debug!(%conn, %key, ts, "message routed");
    }

    pub async fn edit(&self, key: &str, ts: i64, new_text: &str) {
        let mut conversations = self.conversations.lock().await;
        if !conversations.edit_first(key, ts, new_text) {
            tracing::debug!(%key, ts, "edit matched nothing");
            return;
        }
        self.save_conversations(&conversations).await;

        self.transport.broadcast_all(&Outbound::MessageEdited(MessageEdited {
            key: key.to_owned(),
            ts,
            new_text: new_text.to_owned(),
        }));
    }

    pub async fn delete(&self, key: &str, ts: i64) {
        let mut conversations = self.conversations.lock().await;
        if !conversations.delete_first(key, ts) {
            tracing::debug!(%key, ts, "delete matched nothing");
            return;
        }
        self.save_conversations(&conversations).await;

        self.transport.broadcast_all(&Outbound::MessageDeleted(MessageDeleted {
            key: key.to_owned(),
            ts,
        }));
    }
}
