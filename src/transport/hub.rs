use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::Outbound;

use super::{ConnectionId, Transport};

/// Frames a connection may have queued before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 256;

/// Outbound queues of every attached connection. Each socket writer task
/// drains its own queue, so sends never wait on a slow client. A client that
/// stops reading loses frames once its queue is full.
pub struct ConnectionHub {
    outboxes: RwLock<HashMap<ConnectionId, mpsc::Sender<String>>>,
    capacity: usize,
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::with_capacity(OUTBOX_CAPACITY)
    }
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outboxes: RwLock::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn attach(&self, conn: ConnectionId) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.outboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conn, tx);
        rx
    }

    pub fn detach(&self, conn: ConnectionId) {
        self.outboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&conn);
    }

    pub fn len(&self) -> usize {
        self.outboxes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn encode(event: &Outbound) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::error!(%err, "failed to encode outbound event");
            None
        }
    }
}

#[derive(Deserialize)]
struct Tag<'a> {
    #[serde(borrow)]
    event: &'a str,
}

/// Wire name of an encoded frame, for logs.
fn event_name(text: &str) -> &str {
    serde_json::from_str::<Tag>(text).map(|tag| tag.event).unwrap_or("?")
}

fn enqueue(conn: ConnectionId, tx: &mpsc::Sender<String>, text: String) {
    match tx.try_send(text) {
        Ok(()) => {}
        Err(TrySendError::Full(text)) => {
            tracing::trace!(%conn, event = event_name(&text), "outbox full, dropping")
        }
        Err(TrySendError::Closed(text)) => {
            tracing::trace!(%conn, event = event_name(&text), "outbox closed, dropping")
        }
    }
}

impl Transport for ConnectionHub {
    fn send_to(&self, conn: ConnectionId, event: &Outbound) {
        let Some(text) = encode(event) else {
            return;
        };
        let outboxes = self.outboxes.read().unwrap_or_else(PoisonError::into_inner);
        match outboxes.get(&conn) {
            Some(tx) => enqueue(conn, tx, text),
            None => tracing::trace!(%conn, event = event_name(&text), "no such connection, dropping"),
        }
    }

    fn broadcast_all(&self, event: &Outbound) {
        let Some(text) = encode(event) else {
            return;
        };
        let outboxes = self.outboxes.read().unwrap_or_else(PoisonError::into_inner);
        for (conn, tx) in outboxes.iter() {
            enqueue(*conn, tx, text.clone());
        }
    }
}
