use serde_json::Value;

use crate::GetField;
use crate::events::Outbound;

use super::Relay;

/// One-to-one call signaling events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSignal {
    Offer,
    Answer,
    Ice,
    End,
    Decline,
}

impl CallSignal {
    fn wrap(self, payload: Value) -> Outbound {
        match self {
            // callee side listens for the offer under its own name
            CallSignal::Offer => Outbound::IncomingCall(payload),
            CallSignal::Answer => Outbound::CallAnswer(payload),
            CallSignal::Ice => Outbound::CallIce(payload),
            CallSignal::End => Outbound::CallEnd(payload),
            CallSignal::Decline => Outbound::CallDecline(payload),
        }
    }
}

/// Group call signaling, star topology around the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCallSignal {
    Offer,
    Decline,
    Answer,
    Ice,
    End,
}

impl GroupCallSignal {
    fn wrap(self, payload: Value) -> Outbound {
        match self {
            GroupCallSignal::Offer => Outbound::GroupCallOffer(payload),
            GroupCallSignal::Decline => Outbound::GroupCallDecline(payload),
            GroupCallSignal::Answer => Outbound::GroupCallAnswer(payload),
            GroupCallSignal::Ice => Outbound::GroupCallIce(payload),
            GroupCallSignal::End => Outbound::GroupCallEnd(payload),
        }
    }
}

impl Relay {
    /// Forwards the payload untouched to every session of `toId`.
    pub fn relay_call(&self, signal: CallSignal, payload: Value) {
        let Some(to_id) = payload.str_field("toId").map(str::to_owned) else {
            tracing::debug!(?signal, "call signal without toId dropped");
            return;
        };
        let delivered = self.send_to_user(&to_id, &signal.wrap(payload));
        tracing::debug!(?signal, to = %to_id, delivered, "call signal relayed");
    }

    pub async fn relay_group_call(&self, signal: GroupCallSignal, payload: Value) {
        let to_id = payload.str_field("toId").map(str::to_owned);

        let recipients = match (signal, to_id) {
            (GroupCallSignal::End, _) => {
                let Some(members) = self.group_members(&payload).await else {
                    return;
                };
                members
            }
            (_, Some(to_id)) => vec![to_id],
            (GroupCallSignal::Offer, None) => {
                let Some(members) = self.group_members(&payload).await else {
                    return;
                };
                let from_id = payload.str_field("fromId");
                members
                    .into_iter()
                    .filter(|member| Some(member.as_str()) != from_id)
                    .collect()
            }
            (_, None) => {
                tracing::debug!(?signal, "group call signal without toId dropped");
                return;
            }
        };

        let event = signal.wrap(payload);
        let delivered: usize = recipients
            .iter()
            .map(|user_id| self.send_to_user(user_id, &event))
            .sum();
        tracing::debug!(?signal, recipients = recipients.len(), delivered, "group call signal relayed");
    }

    async fn group_members(&self, payload: &Value) -> Option<Vec<String>> {
        let group_id = payload.str_field("groupId")?;
        let members = self.group(group_id).await.map(|group| group.members);
        if members.is_none() {
            tracing::debug!(group = %group_id, "group call for unknown group");
        }
        members
    }
}
