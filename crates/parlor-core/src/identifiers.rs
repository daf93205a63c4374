//! Core identifier types used across the Parlor network
//!
//! Every entity gets its own newtype so ids cannot be mixed up at call
//! sites. Identifiers never generate their own randomness; fresh ids come
//! from [`crate::effects::RandomEffects`] and are wrapped via `from_uuid`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifies a member account.
    ///
    /// Created on first session exchange and stable for the lifetime of the
    /// account; profiles, requests, conversations, and messages all refer
    /// back to it.
    UserId,
    "user"
);

uuid_id!(
    /// Identifies a connection request.
    RequestId,
    "req"
);

uuid_id!(
    /// Identifies a conversation between exactly two members.
    ConversationId,
    "conv"
);

uuid_id!(
    /// Identifies a single message within a conversation.
    MessageId,
    "msg"
);

uuid_id!(
    /// Identifies a session record (not the bearer token itself).
    SessionId,
    "session"
);

/// Opaque bearer token for a session.
///
/// Tokens are minted by the identity provider during the one-time exchange
/// and treated as opaque strings everywhere else. The token is the lookup
/// key for the session record; [`SessionId`] identifies the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are credentials; never print more than a stub.
        let stub = &self.0[..8.min(self.0.len())];
        write!(f, "{stub}…")
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        let id = UserId::from_uuid(Uuid::from_u128(7));
        assert!(id.to_string().starts_with("user-"));
        let id = RequestId::from_uuid(Uuid::from_u128(7));
        assert!(id.to_string().starts_with("req-"));
    }

    #[test]
    fn ids_round_trip_through_uuid() {
        let raw = Uuid::from_u128(42);
        let id = ConversationId::from_uuid(raw);
        assert_eq!(Uuid::from(id), raw);
        assert_eq!(ConversationId::from(raw), id);
    }

    #[test]
    fn token_display_is_truncated() {
        let token = SessionToken::new("abcdefgh-1234-5678");
        let shown = token.to_string();
        assert!(shown.starts_with("abcdefgh"));
        assert!(!shown.contains("1234"));
    }
}
