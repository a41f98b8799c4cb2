use crate::directory::Contact;
use crate::events::Outbound;
use crate::transport::ConnectionId;

use super::Relay;

impl Relay {
    /// Answers whether `target_id` exists. If it does, the target learns about
    /// the asker right away, or on its next introduction when offline. The
    /// asker always gets an answer, `false` when no target was named.
    pub async fn check_exists(
        &self,
        conn: ConnectionId,
        target_id: Option<&str>,
        source_id: Option<&str>,
        source_name: Option<String>,
    ) -> bool {
        let target_id = target_id.filter(|id| !id.is_empty());
        let source_id = source_id.filter(|id| !id.is_empty());

        let mut directory = self.directory.lock().await;
        let exists = target_id.is_some_and(|id| directory.contains(id));

        match (target_id, source_id) {
            (Some(target_id), Some(source_id)) if exists => {
                let reciprocal = Contact {
                    id: source_id.to_owned(),
                    name: source_name,
                };

                if self.sessions.is_online(target_id) {
                    let delivered = self.send_to_user(target_id, &Outbound::ContactAdded(reciprocal));
                    tracing::debug!(to = %target_id, from = %source_id, delivered, "contact pushed");
                } else if directory.enqueue_contact(target_id, reciprocal) {
                    self.save_users(&directory).await;
                    tracing::debug!(to = %target_id, from = %source_id, "contact queued");
                }
            }
            (Some(target_id), None) if exists => {
                tracing::debug!(to = %target_id, "anonymous lookup, no contact to share");
            }
            _ => {}
        }
        drop(directory);

        self.transport.send_to(conn, &Outbound::UserExistsResult(exists));
        exists
    }
}
