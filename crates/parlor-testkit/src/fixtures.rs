//! Scenario fixtures
//!
//! Builders that collapse the boring setup (provider registration,
//! sign-in, onboarding) so scenario tests read like the scenario they
//! exercise.

use crate::{InProcessApi, MockEffects};
use parlor_api::ApiClient;
use parlor_auth::ProviderSession;
use parlor_connections::{ConnectionHandler, RespondDecision};
use parlor_core::records::UserRecord;
use parlor_core::{ConversationId, Result, UserId};
use parlor_profile::ProfileDraft;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One shared backend plus as many member client sessions as a test
/// needs.
pub struct TestNetwork {
    effects: MockEffects,
    connections: Arc<ConnectionHandler>,
    otp_counter: AtomicU64,
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TestNetwork {
    /// A fresh network with deterministic ids.
    pub fn new() -> Self {
        Self {
            effects: MockEffects::new(),
            connections: Arc::new(ConnectionHandler::new()),
            otp_counter: AtomicU64::new(1),
        }
    }

    /// The shared effects, for direct record inspection in assertions.
    pub fn effects(&self) -> &MockEffects {
        &self.effects
    }

    /// A fresh, unauthenticated client session.
    pub fn client(&self) -> InProcessApi {
        InProcessApi::new(self.effects.clone(), Arc::clone(&self.connections))
    }

    /// Sign a member in through the provider round-trip.
    pub async fn signed_in(&self, email: &str, name: &str) -> Result<(InProcessApi, UserRecord)> {
        let serial = self.otp_counter.fetch_add(1, Ordering::SeqCst);
        let one_time_id = format!("otp-{serial}");
        self.effects.register_provider_session(
            &one_time_id,
            ProviderSession {
                id: format!("subject-{serial}"),
                email: email.to_string(),
                name: name.to_string(),
                picture: None,
                session_token: format!("token-{serial}"),
            },
        );

        let client = self.client();
        let handoff = client.exchange_session(&one_time_id).await?;
        let user = handoff.user;
        Ok((client, user))
    }

    /// Sign a member in and walk them through onboarding with an open
    /// profile.
    pub async fn onboarded(&self, email: &str, name: &str) -> Result<(InProcessApi, UserRecord)> {
        let (client, _) = self.signed_in(email, name).await?;
        client.create_profile(&open_profile_draft()).await?;
        let user = client.complete_onboarding(Some(name)).await?;
        Ok((client, user))
    }

    /// Establish a connection between two onboarded members and return
    /// their conversation.
    pub async fn connect(
        &self,
        sender: &InProcessApi,
        receiver: &InProcessApi,
        receiver_id: UserId,
        message: &str,
    ) -> Result<ConversationId> {
        let request = sender.send_connection_request(receiver_id, message).await?;
        let outcome = receiver
            .respond_to_request(request.id, RespondDecision::Accept)
            .await?;
        let conversation = outcome
            .conversation
            .ok_or_else(|| parlor_core::ParlorError::internal("accept produced no conversation"))?;
        Ok(conversation.id)
    }
}

/// A minimal draft that leaves the member open for connections.
pub fn open_profile_draft() -> ProfileDraft {
    ProfileDraft {
        job_title: Some("Engineer".into()),
        company: Some("Acme".into()),
        skills: vec!["Rust".into()],
        ..ProfileDraft::default()
    }
}
