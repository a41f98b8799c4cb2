//! Routing core: presence, chat, contact discovery and call signaling.
//!
//! Each handler mutates shared state first and only then fans out, so a
//! client never hears about a change that has not happened yet.

mod contacts;
mod groups;
mod messages;
mod presence;
mod signal;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::conversations::{ConversationStore, Group, Message};
use crate::directory::{User, UserDirectory};
use crate::events::{Inbound, Outbound};
use crate::sessions::SessionRegistry;
use crate::store::{self, CONVERSATIONS, DocumentStore, USERS};
use crate::transport::{ConnectionId, Transport};

pub use signal::{CallSignal, GroupCallSignal};

pub struct Relay {
    store: Arc<dyn DocumentStore>,
    transport: Arc<dyn Transport>,
    sessions: SessionRegistry,
    conversations: Mutex<ConversationStore>,
    directory: Mutex<UserDirectory>,
}

impl Relay {
    /// Builds a relay from whatever the store currently holds.
    pub async fn load(store: Arc<dyn DocumentStore>, transport: Arc<dyn Transport>) -> Self {
        let conversations: ConversationStore = store::load(store.as_ref(), CONVERSATIONS).await;
        let directory: UserDirectory = store::load(store.as_ref(), USERS).await;
        tracing::info!(
            chats = conversations.chats.len(),
            groups = conversations.groups.len(),
            users = directory.users.len(),
            "relay state loaded"
        );

        Self {
            store,
            transport,
            sessions: SessionRegistry::new(),
            conversations: Mutex::new(conversations),
            directory: Mutex::new(directory),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub async fn dispatch(&self, conn: ConnectionId, event: Inbound) {
        match event {
            Inbound::Introduce(payload) => {
                let _ = self.introduce(conn, payload).await;
            }
            Inbound::SendMessage(payload) => self.send(conn, payload).await,
            Inbound::EditMessage(payload) => self.edit(&payload.key, payload.ts, &payload.new_text).await,
            Inbound::DeleteMessage(payload) => self.delete(&payload.key, payload.ts).await,
            Inbound::CreateGroup(payload) => self.create_group(payload).await,
            Inbound::GroupLeave(payload) => self.leave_group(&payload.group_id, &payload.user_id).await,
            Inbound::CheckUserExists(payload) => {
                self.check_exists(
                    conn,
                    payload.target_id.as_deref(),
                    payload.source_id.as_deref(),
                    payload.source_name,
                )
                .await;
            }
            Inbound::CallOffer(payload) => self.relay_call(CallSignal::Offer, payload),
            Inbound::CallAnswer(payload) => self.relay_call(CallSignal::Answer, payload),
            Inbound::CallIce(payload) => self.relay_call(CallSignal::Ice, payload),
            Inbound::CallEnd(payload) => self.relay_call(CallSignal::End, payload),
            Inbound::CallDecline(payload) => self.relay_call(CallSignal::Decline, payload),
            Inbound::GroupCallOffer(payload) => self.relay_group_call(GroupCallSignal::Offer, payload).await,
            Inbound::GroupCallDecline(payload) => self.relay_group_call(GroupCallSignal::Decline, payload).await,
            Inbound::GroupCallAnswer(payload) => self.relay_group_call(GroupCallSignal::Answer, payload).await,
            Inbound::GroupCallIce(payload) => self.relay_group_call(GroupCallSignal::Ice, payload).await,
            Inbound::GroupCallEnd(payload) => self.relay_group_call(GroupCallSignal::End, payload).await,
        }
    }

    /// Every live connection of `user_id` gets `event`.
    fn send_to_user(&self, user_id: &str, event: &Outbound) -> usize {
        let conns = self.sessions.sessions_for(user_id);
        for conn in &conns {
            self.transport.send_to(*conn, event);
        }
        conns.len()
    }

    async fn save_conversations(&self, doc: &ConversationStore) {
        if let Err(err) = store::save(self.store.as_ref(), CONVERSATIONS, doc).await {
            tracing::warn!(%err, "failed to persist conversations");
        }
    }

    async fn save_users(&self, doc: &UserDirectory) {
        if let Err(err) = store::save(self.store.as_ref(), USERS, doc).await {
            tracing::warn!(%err, "failed to persist users");
        }
    }

    pub async fn conversation(&self, key: &str) -> Vec<Message> {
        self.conversations.lock().await.conversation(key).to_vec()
    }

    pub async fn group(&self, group_id: &str) -> Option<Group> {
        self.conversations.lock().await.group(group_id).cloned()
    }

    pub async fn user(&self, user_id: &str) -> Option<User> {
        self.directory.lock().await.get(user_id).cloned()
    }
}
