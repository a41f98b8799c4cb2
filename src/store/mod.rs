mod memory;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const CONVERSATIONS: &str = "conversations";
pub const USERS: &str = "users";

/// Whole-document persistence. The relay keeps everything in memory and
/// writes a fresh copy of a document after each mutation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, name: &str, body: String) -> Result<(), StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Loads document `name`. Missing, unreadable or malformed documents come
/// back as the empty default.
pub async fn load<D>(store: &dyn DocumentStore, name: &str) -> D
where
    D: DeserializeOwned + Default,
{
    let body = match store.get(name).await {
        Ok(Some(body)) => body,
        Ok(None) => return D::default(),
        Err(err) => {
            tracing::warn!(document = name, %err, "could not read document, starting empty");
            return D::default();
        }
    };

    serde_json::from_str(&body).unwrap_or_else(|err| {
        tracing::warn!(document = name, %err, "malformed document, starting empty");
        D::default()
    })
}

pub async fn save<D: Serialize>(store: &dyn DocumentStore, name: &str, doc: &D) -> Result<(), StoreError> {
    let body = serde_json::to_string(doc)?;
    store.put(name, body).await
}

/// Field deserializer that reads an explicit `null` as the default value.
/// Older documents carry nulls wherever a client left a field out.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
