use crate::conversations::{Group, Message, MessageKind};
use crate::events::{CreateGroupPayload, Outbound};
use crate::now_millis;

use super::Relay;

const SYSTEM_SENDER: &str = "system";

impl Relay {
    /// Creates (or replaces) a group and announces it to everyone.
    pub async fn create_group(&self, payload: CreateGroupPayload) {
        let Some(group_id) = payload.group_id.filter(|id| !id.is_empty()) else {
            tracing::debug!("group without id dropped");
            return;
        };
        let group = Group {
            group_id,
            name: payload.name,
            members: payload.members,
            creator: payload.creator_id,
        };

        let mut conversations = self.conversations.lock().await;
        conversations.put_group(group.clone());
        self.save_conversations(&conversations).await;

        tracing::info!(group = %group.group_id, members = group.members.len(), "group created");
        self.transport.broadcast_all(&Outbound::GroupCreated(group));
    }

    /// Removes a member and posts a notice into the group's history.
    pub async fn leave_group(&self, group_id: &str, user_id: &str) {
        let mut conversations = self.conversations.lock().await;
        if !conversations.leave_group(group_id, user_id) {
            tracing::debug!(group = %group_id, user = %user_id, "leave matched no membership");
            return;
        }

        let notice = Message {
            from_id: SYSTEM_SENDER.to_owned(),
            from_name: Some(String::new()),
            to_id: group_id.to_owned(),
            kind: MessageKind::Group,
            text: Some(format!("<i>{user_id} left the group</i>")),
            image: None,
            ts: now_millis(),
            deleted: false,
        };
        conversations.append(notice.clone());
        self.save_conversations(&conversations).await;

        self.transport.broadcast_all(&Outbound::Message(notice));
    }
}
