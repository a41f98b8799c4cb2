#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use hugrelay::events::{IntroducePayload, Outbound};
use hugrelay::store::{DocumentStore, MemoryStore};
use hugrelay::{ConnectionId, Relay, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Conn(ConnectionId),
    All,
}

/// Transport that remembers every send in order.
#[derive(Default)]
pub struct Recorder {
    log: Mutex<Vec<(Target, Outbound)>>,
}

impl Transport for Recorder {
    fn send_to(&self, conn: ConnectionId, event: &Outbound) {
        self.log.lock().unwrap().push((Target::Conn(conn), event.clone()));
    }

    fn broadcast_all(&self, event: &Outbound) {
        self.log.lock().unwrap().push((Target::All, event.clone()));
    }
}

impl Recorder {
    /// Everything `conn` would have seen: its direct sends and all broadcasts.
    pub fn received_by(&self, conn: ConnectionId) -> Vec<Outbound> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| *target == Target::All || *target == Target::Conn(conn))
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn direct_to(&self, conn: ConnectionId) -> Vec<Outbound> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| *target == Target::Conn(conn))
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<Outbound> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| *target == Target::All)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<(Target, Outbound)> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

pub struct Harness {
    pub relay: Arc<Relay>,
    pub wire: Arc<Recorder>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn with_store(store: Arc<MemoryStore>) -> Self {
        let wire = Arc::new(Recorder::default());
        let relay = Relay::load(store.clone() as Arc<dyn DocumentStore>, wire.clone()).await;
        Self {
            relay: Arc::new(relay),
            wire,
            store,
        }
    }

    /// Opens a connection and introduces it as `user_id` (a reconnect, not an
    /// account claim).
    pub async fn online(&self, user_id: &str) -> ConnectionId {
        let conn = ConnectionId::new();
        self.relay.connect(conn);
        self.relay
            .introduce(conn, introduce(user_id, None))
            .await
            .expect("introduce");
        conn
    }
}

pub fn introduce(user_id: &str, password: Option<&str>) -> IntroducePayload {
    IntroducePayload {
        user_id: Some(user_id.to_owned()),
        name: Some(user_id.to_uppercase()),
        password: password.map(str::to_owned),
    }
}
