//! In-process API client
//!
//! Implements [`ApiClient`] by calling the engines directly over shared
//! [`MockEffects`]: the whole backend, minus HTTP. One instance is one
//! member's client session: it keeps the bearer token the way a browser
//! keeps the session cookie, and an `offline` switch turns every call
//! into a transport failure for degradation tests.

use crate::MockEffects;
use async_trait::async_trait;
use parlor_api::ApiClient;
use parlor_auth::{AuthHandler, SessionHandoff};
use parlor_chat::{ConversationSummary, MessagingHandler};
use parlor_connections::{ConnectionHandler, RequestView, RespondDecision, RespondOutcome};
use parlor_core::records::{ConnectionRecord, MessageRecord, ProfileRecord, UserRecord};
use parlor_core::{
    ConversationId, Page, Paged, ParlorError, RequestId, Result, SessionToken, UserId,
};
use parlor_profile::{BrowseFilter, ProfileDraft, ProfileHandler, ProfileUpdate, ProfileView};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A real [`ApiClient`] backed by the engines, no wire in between.
pub struct InProcessApi {
    effects: MockEffects,
    auth: AuthHandler,
    profiles: ProfileHandler,
    connections: Arc<ConnectionHandler>,
    chat: MessagingHandler,
    token: Mutex<Option<SessionToken>>,
    offline: AtomicBool,
}

impl InProcessApi {
    /// A fresh, unauthenticated client session.
    ///
    /// The [`ConnectionHandler`] is shared across clients so respond
    /// calls from different members serialize through one gate, exactly
    /// like one backend process.
    pub fn new(effects: MockEffects, connections: Arc<ConnectionHandler>) -> Self {
        Self {
            effects,
            auth: AuthHandler::new(),
            profiles: ProfileHandler::new(),
            connections,
            chat: MessagingHandler::new(),
            token: Mutex::new(None),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate losing the network; every call fails `Network` until
    /// restored.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Adopt a session token directly (fixture shortcut).
    pub fn adopt_token(&self, token: SessionToken) {
        *self.token.lock().unwrap_or_else(|p| p.into_inner()) = Some(token);
    }

    fn checked(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ParlorError::network("connection refused"));
        }
        Ok(())
    }

    fn token(&self) -> Result<SessionToken> {
        self.token
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| ParlorError::auth_required("no session credentials"))
    }

    async fn current_user(&self) -> Result<UserRecord> {
        let token = self.token()?;
        self.auth.authenticate(&self.effects, &token).await
    }
}

#[async_trait]
impl ApiClient for InProcessApi {
    async fn exchange_session(&self, one_time_id: &str) -> Result<SessionHandoff> {
        self.checked()?;
        let handoff = self.auth.exchange_session(&self.effects, one_time_id).await?;
        self.adopt_token(handoff.token.clone());
        Ok(handoff)
    }

    async fn me(&self) -> Result<UserRecord> {
        self.checked()?;
        self.current_user().await
    }

    async fn logout(&self) -> Result<()> {
        self.checked()?;
        if let Ok(token) = self.token() {
            self.auth.logout(&self.effects, &token).await?;
        }
        *self.token.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }

    async fn complete_onboarding(&self, name: Option<&str>) -> Result<UserRecord> {
        self.checked()?;
        let token = self.token()?;
        self.auth
            .complete_onboarding(&self.effects, &token, name)
            .await
    }

    async fn my_profile(&self) -> Result<ProfileView> {
        self.checked()?;
        let user = self.current_user().await?;
        self.profiles.get_profile_view(&self.effects, user.id).await
    }

    async fn create_profile(&self, draft: &ProfileDraft) -> Result<ProfileRecord> {
        self.checked()?;
        let user = self.current_user().await?;
        self.profiles
            .create_profile(&self.effects, user.id, draft.clone())
            .await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileRecord> {
        self.checked()?;
        let user = self.current_user().await?;
        self.profiles
            .update_profile(&self.effects, user.id, update.clone())
            .await
    }

    async fn browse(&self, filter: &BrowseFilter, page: Page) -> Result<Paged<ProfileView>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.profiles
            .browse(&self.effects, user.id, filter, page)
            .await
    }

    async fn member_profile(&self, member: UserId) -> Result<ProfileView> {
        self.checked()?;
        self.current_user().await?;
        self.profiles.get_profile_view(&self.effects, member).await
    }

    async fn send_connection_request(
        &self,
        receiver: UserId,
        message: &str,
    ) -> Result<ConnectionRecord> {
        self.checked()?;
        let user = self.current_user().await?;
        self.connections
            .send_request(&self.effects, user.id, receiver, message)
            .await
    }

    async fn received_requests(&self, page: Page) -> Result<Paged<RequestView>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.connections
            .list_received(&self.effects, user.id, page)
            .await
    }

    async fn sent_requests(&self, page: Page) -> Result<Paged<RequestView>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.connections
            .list_sent(&self.effects, user.id, page)
            .await
    }

    async fn respond_to_request(
        &self,
        request: RequestId,
        decision: RespondDecision,
    ) -> Result<RespondOutcome> {
        self.checked()?;
        let user = self.current_user().await?;
        self.connections
            .respond(&self.effects, request, user.id, decision)
            .await
    }

    async fn established_connections(&self, page: Page) -> Result<Paged<RequestView>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.connections
            .list_established(&self.effects, user.id, page)
            .await
    }

    async fn conversations(&self, page: Page) -> Result<Paged<ConversationSummary>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.chat
            .list_conversations(&self.effects, user.id, page)
            .await
    }

    async fn conversation(&self, conversation: ConversationId) -> Result<ConversationSummary> {
        self.checked()?;
        let user = self.current_user().await?;
        self.chat
            .conversation_detail(&self.effects, conversation, user.id)
            .await
    }

    async fn messages(
        &self,
        conversation: ConversationId,
        page: Page,
    ) -> Result<Paged<MessageRecord>> {
        self.checked()?;
        let user = self.current_user().await?;
        self.chat
            .open_conversation(&self.effects, conversation, user.id, page)
            .await
    }

    async fn send_message(
        &self,
        conversation: ConversationId,
        content: &str,
    ) -> Result<MessageRecord> {
        self.checked()?;
        let user = self.current_user().await?;
        self.chat
            .send_message(&self.effects, conversation, user.id, content)
            .await
    }
}
