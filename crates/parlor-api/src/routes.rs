//! Endpoint table
//!
//! One variant per operation, so client implementations and tests agree on
//! the method/path pair without string literals scattered around.

use parlor_core::{ConversationId, RequestId, UserId};

/// HTTP method + path for every operation in the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Exchange a one-time session id (header `X-Session-ID`)
    ExchangeSession,
    /// Current identity
    Me,
    /// Deactivate the session
    Logout,
    /// Flip the onboarding flag
    CompleteOnboarding,
    /// Own profile
    GetProfile,
    /// Create own profile
    CreateProfile,
    /// Edit own profile
    UpdateProfile,
    /// Browse members open for connection
    Browse,
    /// Another member's profile
    MemberProfile(UserId),
    /// Send a connection request
    SendRequest,
    /// Requests awaiting my decision
    ReceivedRequests,
    /// Requests I sent
    SentRequests,
    /// Accept or reject a request
    Respond(RequestId),
    /// Established connections
    Established,
    /// My conversations
    Conversations,
    /// One conversation's detail
    Conversation(ConversationId),
    /// One conversation's history
    Messages(ConversationId),
    /// Append a message
    SendMessage(ConversationId),
}

impl Endpoint {
    /// HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            Self::ExchangeSession
            | Self::Logout
            | Self::CompleteOnboarding
            | Self::CreateProfile
            | Self::SendRequest
            | Self::SendMessage(_) => "POST",
            Self::UpdateProfile | Self::Respond(_) => "PUT",
            _ => "GET",
        }
    }

    /// Path under the backend base URL
    pub fn path(&self) -> String {
        match self {
            Self::ExchangeSession => "/api/auth/session".into(),
            Self::Me => "/api/auth/me".into(),
            Self::Logout => "/api/auth/logout".into(),
            Self::CompleteOnboarding => "/api/auth/complete-onboarding".into(),
            Self::GetProfile | Self::CreateProfile | Self::UpdateProfile => "/api/profile".into(),
            Self::Browse => "/api/profile/browse".into(),
            Self::MemberProfile(user) => format!("/api/profile/{}", user.uuid()),
            Self::SendRequest => "/api/connections/request".into(),
            Self::ReceivedRequests => "/api/connections/requests/received".into(),
            Self::SentRequests => "/api/connections/requests/sent".into(),
            Self::Respond(id) => format!("/api/connections/requests/{}/respond", id.uuid()),
            Self::Established => "/api/connections/established".into(),
            Self::Conversations => "/api/conversations".into(),
            Self::Conversation(id) => format!("/api/conversations/{}", id.uuid()),
            Self::Messages(id) | Self::SendMessage(id) => {
                format!("/api/conversations/{}/messages", id.uuid())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn paths_match_the_contract() {
        assert_eq!(Endpoint::ExchangeSession.path(), "/api/auth/session");
        assert_eq!(Endpoint::ExchangeSession.method(), "POST");
        assert_eq!(Endpoint::Me.path(), "/api/auth/me");

        let id = RequestId::from_uuid(Uuid::from_u128(1));
        assert_eq!(
            Endpoint::Respond(id).path(),
            format!("/api/connections/requests/{}/respond", id.uuid())
        );
        assert_eq!(Endpoint::Respond(id).method(), "PUT");

        let conv = ConversationId::from_uuid(Uuid::from_u128(2));
        assert_eq!(Endpoint::Messages(conv).method(), "GET");
        assert_eq!(Endpoint::SendMessage(conv).method(), "POST");
        assert_eq!(Endpoint::Messages(conv).path(), Endpoint::SendMessage(conv).path());
    }
}
