mod hub;
pub mod ws;

use std::fmt;

use uuid::Uuid;

use crate::events::Outbound;

pub use hub::ConnectionHub;

/// Handle of one live client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// The two delivery primitives the relay is allowed to use. Both are
/// fire-and-forget: a send to a connection that is gone is dropped.
pub trait Transport: Send + Sync {
    fn send_to(&self, conn: ConnectionId, event: &Outbound);
    fn broadcast_all(&self, event: &Outbound);
}
