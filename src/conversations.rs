use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const DIRECT_PREFIX: &str = "chat:";
const GROUP_PREFIX: &str = "group:";
const PAIR_DELIMITER: &str = "__";

pub const EDITED_SUFFIX: &str = " (edited)";
pub const DELETED_TEXT: &str = "message deleted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Direct,
    Group,
}

/// A chat message as stored and as delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub from_id: String,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub to_id: String,
    #[serde(rename = "type", default, deserialize_with = "crate::store::null_as_default")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub ts: i64,
    #[serde(
        default,
        deserialize_with = "crate::store::null_as_default",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub deleted: bool,
}

impl Message {
    /// The key of the conversation this message belongs to.
    pub fn conversation_key(&self) -> String {
        match self.kind {
            MessageKind::Direct => direct_key(&self.from_id, &self.to_id),
            MessageKind::Group => group_key(&self.to_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub group_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub members: Vec<String>,
    #[serde(default)]
    pub creator: Option<String>,
}

/// Key of a one-to-one conversation. Both participants resolve to the same
/// key no matter who is `a` and who is `b`.
pub fn direct_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{DIRECT_PREFIX}{lo}{PAIR_DELIMITER}{hi}")
}

pub fn group_key(group_id: &str) -> String {
    format!("{GROUP_PREFIX}{group_id}")
}

/// Conversation history plus group records. Persisted as the
/// `conversations` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStore {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub chats: BTreeMap<String, Vec<Message>>,
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub groups: BTreeMap<String, Group>,
}

impl ConversationStore {
    /// Appends `message` to its conversation and returns the key used.
    pub fn append(&mut self, message: Message) -> String {
        let key = message.conversation_key();
        self.chats.entry(key.clone()).or_default().push(message);
        key
    }

    pub fn conversation(&self, key: &str) -> &[Message] {
        self.chats.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    fn first_at_mut(&mut self, key: &str, ts: i64) -> Option<&mut Message> {
        self.chats.get_mut(key)?.iter_mut().find(|m| m.ts == ts)
    }

    /// Rewrites the text of the first message at `ts`. Returns false when
    /// nothing matched.
    pub fn edit_first(&mut self, key: &str, ts: i64, new_text: &str) -> bool {
        let Some(message) = self.first_at_mut(key, ts) else {
            return false;
        };
        message.text = Some(format!("{new_text}{EDITED_SUFFIX}"));
        true
    }

    /// Tombstones the first message at `ts`. Returns false when nothing
    /// matched.
    pub fn delete_first(&mut self, key: &str, ts: i64) -> bool {
        let Some(message) = self.first_at_mut(key, ts) else {
            return false;
        };
        message.text = Some(DELETED_TEXT.to_owned());
        message.deleted = true;
        true
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.get(group_id)
    }

    pub fn put_group(&mut self, group: Group) {
        self.groups.insert(group.group_id.clone(), group);
    }

    /// Drops one membership of `user_id` from the group. Returns false if the
    /// group is unknown or the user was not a member.
    pub fn leave_group(&mut self, group_id: &str, user_id: &str) -> bool {
        let Some(group) = self.groups.get_mut(group_id) else {
            return false;
        };
        match group.members.iter().position(|member| member == user_id) {
            Some(index) => {
                group.members.remove(index);
                true
            }
            None => false,
        }
    }
}
