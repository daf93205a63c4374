//! Connection request records

use crate::identifiers::{RequestId, UserId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a connection request.
///
/// `Pending` is the only state with outgoing transitions under normal
/// flow: the receiver moves it to `Accepted` or `Rejected` exactly once.
/// `Blocked` is reachable from any state through moderation and, like the
/// other responded states, is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Waiting for the receiver's decision
    #[default]
    Pending,
    /// Receiver accepted; the pair is an established connection
    Accepted,
    /// Receiver declined
    Rejected,
    /// Frozen by moderation
    Blocked,
}

impl ConnectionStatus {
    /// Whether the receiver may still respond.
    pub fn can_respond(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether this state has no outgoing transitions under normal flow.
    pub fn is_terminal(self) -> bool {
        !self.can_respond()
    }

    /// Whether a request in this state blocks a new request between the
    /// same pair. Rejected and blocked requests do not: the pair may try
    /// again later.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Lowercase wire/display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
        }
    }
}

/// A directed connection request from one member to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Request identifier
    pub id: RequestId,
    /// Who asked
    pub sender_id: UserId,
    /// Who decides
    pub receiver_id: UserId,
    /// Introduction message, non-empty
    pub message: String,
    /// Lifecycle state
    pub status: ConnectionStatus,
    /// When the request was sent
    pub created_at: Timestamp,
    /// Set exactly once, on the transition out of `Pending`
    pub responded_at: Option<Timestamp>,
}

impl ConnectionRecord {
    /// Key prefix for connection request records
    pub const KEY_PREFIX: &'static str = "connreq:";

    /// Storage key for a request
    pub fn key(id: RequestId) -> String {
        format!("{}{}", Self::KEY_PREFIX, id.uuid())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(self.id)
    }

    /// Whether this request involves the given member, in either role.
    pub fn touches(&self, user: UserId) -> bool {
        self.sender_id == user || self.receiver_id == user
    }

    /// The other member of the pair, from `user`'s point of view.
    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        if self.sender_id == user {
            Some(self.receiver_id)
        } else if self.receiver_id == user {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Whether this request links the unordered pair `{a, b}`.
    pub fn links(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// Whether this request blocks a new request between its pair.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(n: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n))
    }

    fn record(status: ConnectionStatus) -> ConnectionRecord {
        ConnectionRecord {
            id: RequestId::from_uuid(Uuid::from_u128(9)),
            sender_id: user(1),
            receiver_id: user(2),
            message: "hello".into(),
            status,
            created_at: Timestamp::from_millis(0),
            responded_at: None,
        }
    }

    #[test]
    fn only_pending_can_respond() {
        assert!(ConnectionStatus::Pending.can_respond());
        for status in [
            ConnectionStatus::Accepted,
            ConnectionStatus::Rejected,
            ConnectionStatus::Blocked,
        ] {
            assert!(status.is_terminal());
        }
    }

    #[test]
    fn rejected_requests_do_not_block_the_pair() {
        assert!(record(ConnectionStatus::Pending).is_active());
        assert!(record(ConnectionStatus::Accepted).is_active());
        assert!(!record(ConnectionStatus::Rejected).is_active());
        assert!(!record(ConnectionStatus::Blocked).is_active());
    }

    #[test]
    fn links_is_direction_blind() {
        let r = record(ConnectionStatus::Pending);
        assert!(r.links(user(1), user(2)));
        assert!(r.links(user(2), user(1)));
        assert!(!r.links(user(1), user(3)));
    }

    #[test]
    fn counterpart_resolves_both_roles() {
        let r = record(ConnectionStatus::Pending);
        assert_eq!(r.counterpart(user(1)), Some(user(2)));
        assert_eq!(r.counterpart(user(2)), Some(user(1)));
        assert_eq!(r.counterpart(user(3)), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ConnectionStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
    }
}
