//! Conversation and message records

use crate::identifiers::{ConversationId, MessageId, UserId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A messaging channel between exactly two members.
///
/// Created exactly once per accepted connection, keyed by the unordered
/// pair; never created otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Conversation identifier
    pub id: ConversationId,
    /// One participant
    pub user1_id: UserId,
    /// The other participant
    pub user2_id: UserId,
    /// When the conversation was created
    pub created_at: Timestamp,
    /// Timestamp of the newest message, if any
    pub last_message_at: Option<Timestamp>,
    /// Soft-delete flag
    pub is_active: bool,
}

impl ConversationRecord {
    /// Key prefix for conversation records
    pub const KEY_PREFIX: &'static str = "conversation:";

    /// Storage key for a conversation
    pub fn key(id: ConversationId) -> String {
        format!("{}{}", Self::KEY_PREFIX, id.uuid())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(self.id)
    }

    /// Whether the given member participates in this conversation.
    pub fn involves(&self, user: UserId) -> bool {
        self.user1_id == user || self.user2_id == user
    }

    /// The other participant, from `user`'s point of view.
    pub fn other_participant(&self, user: UserId) -> Option<UserId> {
        if self.user1_id == user {
            Some(self.user2_id)
        } else if self.user2_id == user {
            Some(self.user1_id)
        } else {
            None
        }
    }

    /// Whether this conversation links the unordered pair `{a, b}`.
    pub fn links(&self, a: UserId, b: UserId) -> bool {
        (self.user1_id == a && self.user2_id == b) || (self.user1_id == b && self.user2_id == a)
    }

    /// Sort key for conversation lists: newest activity first, falling
    /// back to creation time for conversations with no messages yet.
    pub fn effective_activity(&self) -> Timestamp {
        self.last_message_at.unwrap_or(self.created_at)
    }
}

/// A single message in a conversation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message identifier
    pub id: MessageId,
    /// The conversation this message belongs to
    pub conversation_id: ConversationId,
    /// Author; always one of the conversation's two participants
    pub sender_id: UserId,
    /// Trimmed, non-empty body
    pub content: String,
    /// When the message was appended
    pub timestamp: Timestamp,
    /// Set when the counterpart opens the conversation
    pub is_read: bool,
}

impl MessageRecord {
    /// Key prefix for message records
    pub const KEY_PREFIX: &'static str = "message:";

    /// Storage key for a message
    pub fn key(conversation: ConversationId, id: MessageId) -> String {
        format!("{}{}:{}", Self::KEY_PREFIX, conversation.uuid(), id.uuid())
    }

    /// Scan prefix for one conversation's messages
    pub fn conversation_prefix(conversation: ConversationId) -> String {
        format!("{}{}:", Self::KEY_PREFIX, conversation.uuid())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(self.conversation_id, self.id)
    }

    /// Whether this message counts toward `viewer`'s unread total.
    pub fn unread_by(&self, viewer: UserId) -> bool {
        !self.is_read && self.sender_id != viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(n: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n))
    }

    fn conversation() -> ConversationRecord {
        ConversationRecord {
            id: ConversationId::from_uuid(Uuid::from_u128(5)),
            user1_id: user(1),
            user2_id: user(2),
            created_at: Timestamp::from_millis(100),
            last_message_at: None,
            is_active: true,
        }
    }

    #[test]
    fn activity_falls_back_to_creation() {
        let mut conv = conversation();
        assert_eq!(conv.effective_activity(), Timestamp::from_millis(100));
        conv.last_message_at = Some(Timestamp::from_millis(900));
        assert_eq!(conv.effective_activity(), Timestamp::from_millis(900));
    }

    #[test]
    fn unread_ignores_own_messages() {
        let msg = MessageRecord {
            id: MessageId::from_uuid(Uuid::from_u128(7)),
            conversation_id: ConversationId::from_uuid(Uuid::from_u128(5)),
            sender_id: user(1),
            content: "hi".into(),
            timestamp: Timestamp::from_millis(0),
            is_read: false,
        };
        assert!(msg.unread_by(user(2)));
        assert!(!msg.unread_by(user(1)));
    }
}
