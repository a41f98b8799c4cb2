use crate::error::RelayError;
use crate::events::{IntroducePayload, IntroduceResult, Outbound, PresenceUpdate};
use crate::now_millis;
use crate::transport::ConnectionId;

use super::Relay;

impl Relay {
    pub fn connect(&self, conn: ConnectionId) {
        tracing::debug!(%conn, "connection opened");
    }

    /// Binds `conn` to a user and brings everyone up to date. The reply to
    /// the introducing connection always comes last.
    pub async fn introduce(&self, conn: ConnectionId, payload: IntroducePayload) -> Result<(), RelayError> {
        let result = self.admit(conn, payload).await;
        let reply = match &result {
            Ok(()) => IntroduceResult::accepted(),
            Err(err) => {
                tracing::info!(%conn, %err, "introduction refused");
                IntroduceResult::rejected(err.reason())
            }
        };
        self.transport.send_to(conn, &Outbound::IntroduceResult(reply));
        result
    }

    async fn admit(&self, conn: ConnectionId, payload: IntroducePayload) -> Result<(), RelayError> {
        let user_id = payload
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(RelayError::InvalidIdentity)?
            .to_owned();

        // held until the end so introductions and disconnects of one user
        // cannot interleave their broadcasts
        let mut directory = self.directory.lock().await;
        if payload.claims_new_account() && directory.contains(&user_id) {
            return Err(RelayError::AlreadyExists(user_id));
        }

        let now = now_millis();
        if let Some(displaced) = self.sessions.add_session(&user_id, conn) {
            if displaced.was_last {
                directory.touch(&displaced.user_id, now);
                self.transport
                    .broadcast_all(&Outbound::PresenceUpdate(PresenceUpdate::offline(&displaced.user_id, now)));
            }
        }

        self.transport
            .broadcast_all(&Outbound::PresenceUpdate(PresenceUpdate::online(&user_id)));
        self.transport
            .broadcast_all(&Outbound::PresenceInit(self.sessions.online_user_ids()));

        let pending = directory.check_in(&user_id, payload.name.as_deref(), now);
        self.save_users(&directory).await;

        for contact in pending {
            self.transport.send_to(conn, &Outbound::ContactAdded(contact));
        }

        tracing::info!(%conn, user = %user_id, "user introduced");
        Ok(())
    }

    pub async fn disconnect(&self, conn: ConnectionId) {
        let mut directory = self.directory.lock().await;
        let Some(removal) = self.sessions.remove_session(conn) else {
            tracing::debug!(%conn, "anonymous connection closed");
            return;
        };

        if !removal.was_last {
            tracing::debug!(%conn, user = %removal.user_id, "session closed, others remain");
            return;
        }

        let now = now_millis();
        directory.touch(&removal.user_id, now);
        self.save_users(&directory).await;
        self.transport
            .broadcast_all(&Outbound::PresenceUpdate(PresenceUpdate::offline(&removal.user_id, now)));
        tracing::info!(%conn, user = %removal.user_id, "user offline");
    }
}
