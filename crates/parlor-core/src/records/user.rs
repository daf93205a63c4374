//! Member account records

use crate::identifiers::UserId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A member account.
///
/// Created on the first session exchange for an email address and never
/// hard-deleted. `onboarding_completed` is the flag the auth gate splits
/// on; it flips exactly once, together with profile creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier
    pub id: UserId,
    /// Login email, unique across accounts
    pub email: String,
    /// Display name; may be empty until onboarding
    pub name: String,
    /// Avatar URL from the identity provider
    pub picture: Option<String>,
    /// When the account was created
    pub created_at: Timestamp,
    /// Soft-delete flag
    pub is_active: bool,
    /// Whether the member finished the onboarding flow
    pub onboarding_completed: bool,
}

impl UserRecord {
    /// Key prefix for account records
    pub const KEY_PREFIX: &'static str = "user:";

    /// Storage key for an account
    pub fn key(id: UserId) -> String {
        format!("{}{}", Self::KEY_PREFIX, id.uuid())
    }

    /// Index key mapping a login email to its account id
    pub fn email_key(email: &str) -> String {
        format!("user_email:{}", email.to_ascii_lowercase())
    }

    /// Storage key for this record
    pub fn storage_key(&self) -> String {
        Self::key(self.id)
    }
}
