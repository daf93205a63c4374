//! The client-side endpoint contract

use async_trait::async_trait;
use parlor_auth::SessionHandoff;
use parlor_chat::ConversationSummary;
use parlor_connections::{RequestView, RespondDecision, RespondOutcome};
use parlor_core::records::{ConnectionRecord, MessageRecord, ProfileRecord, UserRecord};
use parlor_core::{ConversationId, Page, Paged, RequestId, Result, UserId};
use parlor_profile::{BrowseFilter, ProfileDraft, ProfileUpdate, ProfileView};

/// One method per endpoint in the contract (see [`crate::Endpoint`]).
///
/// An implementation represents one member's client session: it carries
/// the session credentials implicitly (cookie or bearer header) and
/// refreshes them through [`Self::exchange_session`]. Every method is a
/// single request/response exchange with no retries and no background
/// work, and an abandoned (dropped) call either completed on the server or did
/// not; it never leaves partial state behind for the next call to trip
/// over.
///
/// Errors come back as [`parlor_core::ParlorError`] variants rebuilt from
/// the wire (see [`crate::decode_failure`]), so call sites match on kinds,
/// never on response shapes.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `POST /api/auth/session`: exchange a one-time id for a session.
    async fn exchange_session(&self, one_time_id: &str) -> Result<SessionHandoff>;

    /// `GET /api/auth/me`: the identity behind the current credentials.
    async fn me(&self) -> Result<UserRecord>;

    /// `POST /api/auth/logout`: deactivate the session server-side.
    async fn logout(&self) -> Result<()>;

    /// `POST /api/auth/complete-onboarding`: flip the onboarding flag,
    /// optionally updating the display name.
    async fn complete_onboarding(&self, name: Option<&str>) -> Result<UserRecord>;

    /// `GET /api/profile`: own profile; `NotFound` doubles as the
    /// onboarding-incomplete signal.
    async fn my_profile(&self) -> Result<ProfileView>;

    /// `POST /api/profile`: create own profile.
    async fn create_profile(&self, draft: &ProfileDraft) -> Result<ProfileRecord>;

    /// `PUT /api/profile`: edit own profile.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileRecord>;

    /// `GET /api/profile/browse`: members open for connection.
    async fn browse(&self, filter: &BrowseFilter, page: Page) -> Result<Paged<ProfileView>>;

    /// `GET /api/profile/{user_id}`: another member's profile.
    async fn member_profile(&self, user: UserId) -> Result<ProfileView>;

    /// `POST /api/connections/request`: send a connection request.
    async fn send_connection_request(
        &self,
        receiver: UserId,
        message: &str,
    ) -> Result<ConnectionRecord>;

    /// `GET /api/connections/requests/received`
    async fn received_requests(&self, page: Page) -> Result<Paged<RequestView>>;

    /// `GET /api/connections/requests/sent`
    async fn sent_requests(&self, page: Page) -> Result<Paged<RequestView>>;

    /// `PUT /api/connections/requests/{id}/respond`
    async fn respond_to_request(
        &self,
        request: RequestId,
        decision: RespondDecision,
    ) -> Result<RespondOutcome>;

    /// `GET /api/connections/established`
    async fn established_connections(&self, page: Page) -> Result<Paged<RequestView>>;

    /// `GET /api/conversations`
    async fn conversations(&self, page: Page) -> Result<Paged<ConversationSummary>>;

    /// `GET /api/conversations/{id}`
    async fn conversation(&self, conversation: ConversationId) -> Result<ConversationSummary>;

    /// `GET /api/conversations/{id}/messages`: ascending history window;
    /// marks the counterpart's messages read as a side effect.
    async fn messages(
        &self,
        conversation: ConversationId,
        page: Page,
    ) -> Result<Paged<MessageRecord>>;

    /// `POST /api/conversations/{id}/messages`: append a message.
    async fn send_message(
        &self,
        conversation: ConversationId,
        content: &str,
    ) -> Result<MessageRecord>;
}
