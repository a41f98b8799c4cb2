use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::transport::ConnectionId;

/// A connection that was taken away from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub user_id: String,
    /// The user has no live connection left.
    pub was_last: bool,
}

#[derive(Default)]
struct Sessions {
    by_user: HashMap<String, HashSet<ConnectionId>>,
    owners: HashMap<ConnectionId, String>,
}

impl Sessions {
    fn detach(&mut self, conn: ConnectionId) -> Option<Removal> {
        let user_id = self.owners.remove(&conn)?;
        let was_last = match self.by_user.get_mut(&user_id) {
            Some(conns) => {
                conns.remove(&conn);
                conns.is_empty()
            }
            None => true,
        };
        if was_last {
            self.by_user.remove(&user_id);
        }
        Some(Removal { user_id, was_last })
    }
}

/// Which users are online, and through which connections.
///
/// Both indexes live behind one lock, so readers never observe a connection
/// that is owned in one direction but not the other.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<Sessions>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Sessions> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sessions> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `conn` to `user_id`. If the connection was bound to a different
    /// user before, that binding is dropped and reported.
    pub fn add_session(&self, user_id: &str, conn: ConnectionId) -> Option<Removal> {
        let mut sessions = self.write();
        let owned_by_other = sessions
            .owners
            .get(&conn)
            .is_some_and(|owner| owner.as_str() != user_id);
        let displaced = if owned_by_other { sessions.detach(conn) } else { None };
        sessions.owners.insert(conn, user_id.to_owned());
        sessions.by_user.entry(user_id.to_owned()).or_default().insert(conn);
        displaced
    }

    pub fn remove_session(&self, conn: ConnectionId) -> Option<Removal> {
        self.write().detach(conn)
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.read().by_user.contains_key(user_id)
    }

    pub fn sessions_for(&self, user_id: &str) -> Vec<ConnectionId> {
        self.read()
            .by_user
            .get(user_id)
            .map(|conns| conns.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Sorted ids of every user with at least one live connection.
    pub fn online_user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().by_user.keys().cloned().collect();
        ids.sort();
        ids
    }
}
