//! Named events exchanged with clients.
//!
//! Every frame on the socket is `{"event": "<name>", "data": <payload>}`.
//! Call-signaling payloads are opaque to the relay and stay `Value`s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversations::{Group, Message, MessageKind};
use crate::directory::Contact;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Inbound {
    Introduce(IntroducePayload),
    SendMessage(SendMessagePayload),
    EditMessage(EditMessagePayload),
    DeleteMessage(DeleteMessagePayload),
    CreateGroup(CreateGroupPayload),
    GroupLeave(GroupLeavePayload),
    CheckUserExists(CheckUserExistsPayload),
    CallOffer(Value),
    CallAnswer(Value),
    CallIce(Value),
    CallEnd(Value),
    CallDecline(Value),
    GroupCallOffer(Value),
    GroupCallDecline(Value),
    GroupCallAnswer(Value),
    GroupCallIce(Value),
    GroupCallEnd(Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroducePayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Only present when the client is creating its account.
    #[serde(default)]
    pub password: Option<String>,
}

impl IntroducePayload {
    pub fn claims_new_account(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub from_id: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub to_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ts: Option<i64>,
}

impl SendMessagePayload {
    /// Builds the stored message, or `None` when either endpoint is missing.
    pub fn into_message(self, now: i64) -> Option<Message> {
        Some(Message {
            from_id: self.from_id.filter(|id| !id.is_empty())?,
            from_name: self.from_name,
            to_id: self.to_id.filter(|id| !id.is_empty())?,
            kind: self.kind,
            text: self.text,
            image: self.image,
            ts: self.ts.unwrap_or(now),
            deleted: false,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessagePayload {
    pub key: String,
    pub ts: i64,
    pub new_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMessagePayload {
    pub key: String,
    pub ts: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupPayload {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLeavePayload {
    pub group_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUserExistsPayload {
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroduceResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IntroduceResult {
    pub fn accepted() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn rejected(reason: &str) -> Self {
        Self { ok: false, reason: Some(reason.to_owned()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub id: String,
    pub online: bool,
    #[serde(rename = "lastSeen", default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
}

impl PresenceUpdate {
    pub fn online(id: &str) -> Self {
        Self { id: id.to_owned(), online: true, last_seen: None }
    }

    pub fn offline(id: &str, last_seen: i64) -> Self {
        Self { id: id.to_owned(), online: false, last_seen: Some(last_seen) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEdited {
    pub key: String,
    pub ts: i64,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDeleted {
    pub key: String,
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Outbound {
    IntroduceResult(IntroduceResult),
    PresenceUpdate(PresenceUpdate),
    PresenceInit(Vec<String>),
    ContactAdded(Contact),
    Message(Message),
    MessageEdited(MessageEdited),
    MessageDeleted(MessageDeleted),
    GroupCreated(Group),
    UserExistsResult(bool),
    IncomingCall(Value),
    CallAnswer(Value),
    CallIce(Value),
    CallEnd(Value),
    CallDecline(Value),
    GroupCallOffer(Value),
    GroupCallDecline(Value),
    GroupCallAnswer(Value),
    GroupCallIce(Value),
    GroupCallEnd(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_named_frames() {
        let frame = json!({
            "event": "introduce",
            "data": {"userId": "alice", "name": "Alice", "password": "pw"}
        });
        let Inbound::Introduce(payload) = serde_json::from_value(frame).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(payload.user_id.as_deref(), Some("alice"));
        assert!(payload.claims_new_account());

        let frame = json!({"event": "call_ice", "data": {"toId": "bob", "candidate": {"x": 1}}});
        let Inbound::CallIce(payload) = serde_json::from_value(frame).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(payload["candidate"]["x"], 1);
    }

    #[test]
    fn unknown_events_fail_to_decode() {
        let frame = json!({"event": "teleport", "data": {}});
        assert!(serde_json::from_value::<Inbound>(frame).is_err());
    }

    #[test]
    fn send_payload_needs_both_ends() {
        let payload = SendMessagePayload {
            from_id: Some("alice".into()),
            to_id: None,
            ..Default::default()
        };
        assert!(payload.into_message(1).is_none());

        let payload = SendMessagePayload {
            from_id: Some("alice".into()),
            to_id: Some("bob".into()),
            text: Some("hey".into()),
            ..Default::default()
        };
        let msg = payload.into_message(99).unwrap();
        assert_eq!(msg.ts, 99);
        assert_eq!(msg.kind, MessageKind::Direct);
    }

    #[test]
    fn offline_presence_carries_last_seen() {
        let json = serde_json::to_value(Outbound::PresenceUpdate(PresenceUpdate::offline("bob", 5))).unwrap();
        assert_eq!(json, json!({"event": "presence_update", "data": {"id": "bob", "online": false, "lastSeen": 5}}));

        let json = serde_json::to_value(Outbound::PresenceUpdate(PresenceUpdate::online("bob"))).unwrap();
        assert_eq!(json["data"], json!({"id": "bob", "online": true}));
    }
}
