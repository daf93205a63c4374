//! Session records

use crate::identifiers::{SessionId, SessionToken, UserId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A bearer session for one account.
///
/// At most one active session exists per account: minting a new one drops
/// the previous record. Logout deactivates rather than deletes, so a stale
/// token fails closed instead of looking like it never existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Record identifier
    pub id: SessionId,
    /// The account this session authenticates
    pub user_id: UserId,
    /// Opaque bearer token presented by the client
    pub token: SessionToken,
    /// Hard expiry
    pub expires_at: Timestamp,
    /// When the session was minted
    pub created_at: Timestamp,
    /// Cleared on logout
    pub is_active: bool,
}

impl SessionRecord {
    /// Key prefix for session records
    pub const KEY_PREFIX: &'static str = "session:";

    /// Storage key for a session, by its bearer token
    pub fn key(token: &SessionToken) -> String {
        format!("{}{}", Self::KEY_PREFIX, token.as_str())
    }

    /// Index key holding the account's current token
    pub fn user_index_key(user_id: UserId) -> String {
        format!("user_session:{}", user_id.uuid())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(&self.token)
    }

    /// Whether this session authenticates requests at `now`.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_active && now < self.expires_at
    }
}
