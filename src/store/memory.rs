use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;

use super::DocumentStore;

/// Keeps documents in process memory. Used by tests and by `--database-url
/// memory`.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until switched back.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn raw(&self, name: &str) -> Option<String> {
        self.docs.lock().await.get(name).cloned()
    }

    pub async fn seed(&self, name: &str, body: &str) {
        self.docs.lock().await.insert(name.to_owned(), body.to_owned());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.docs.lock().await.get(name).cloned())
    }

    async fn put(&self, name: &str, body: String) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {name} rejected")));
        }
        self.docs.lock().await.insert(name.to_owned(), body);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
