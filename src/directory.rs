use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// A reciprocal contact record, pushed as `contact_added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub name: String,
    #[serde(rename = "lastSeen", default, deserialize_with = "crate::store::null_as_default")]
    pub last_seen: i64,
    #[serde(
        default,
        deserialize_with = "crate::store::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub pending_contacts: Vec<Contact>,
}

/// Every user that ever introduced itself. Persisted as the `users`
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(default, deserialize_with = "crate::store::null_as_default")]
    pub users: BTreeMap<String, User>,
}

impl UserDirectory {
    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn get(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Creates or refreshes the record of a user that just came online and
    /// hands back the contacts queued for it, leaving the queue empty.
    pub fn check_in(&mut self, user_id: &str, name: Option<&str>, now: i64) -> Vec<Contact> {
        let user = self.users.entry(user_id.to_owned()).or_insert_with(|| User {
            id: user_id.to_owned(),
            name: String::new(),
            last_seen: now,
            pending_contacts: Vec::new(),
        });

        match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => user.name = name.to_owned(),
            None if user.name.is_empty() => user.name = random_alias(),
            None => {}
        }
        user.last_seen = now;

        std::mem::take(&mut user.pending_contacts)
    }

    /// Stamps the last-seen time of a known user. Unknown ids are ignored.
    pub fn touch(&mut self, user_id: &str, now: i64) -> bool {
        match self.users.get_mut(user_id) {
            Some(user) => {
                user.last_seen = now;
                true
            }
            None => false,
        }
    }

    /// Queues `contact` for an offline user, at most once per contact id.
    /// Returns true if the queue changed.
    pub fn enqueue_contact(&mut self, user_id: &str, contact: Contact) -> bool {
        let Some(user) = self.users.get_mut(user_id) else {
            return false;
        };
        if user.pending_contacts.iter().any(|c| c.id == contact.id) {
            return false;
        }
        user.pending_contacts.push(contact);
        true
    }
}

const ADJECTIVES: &[&str] = &[
    "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
    "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy",
];

const NOUNS: &[&str] = &[
    "Fox", "Bear", "Eagle", "Wolf", "Otter", "Tiger", "Lion", "Owl", "Rabbit",
    "Falcon", "Heron", "Panda", "Kitten", "Phoenix", "Turtle", "Dolphin",
];

fn random_alias() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Nameless");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("User");
    format!("{adjective} {noun}")
}
