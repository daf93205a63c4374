//! Auth handler - session exchange, validation, and onboarding completion
//!
//! The handler is stateless and takes an effect reference per call; all
//! session and account state lives behind `StorageEffects`.

use crate::provider::IdentityProviderEffects;
use parlor_core::effects::{ClockEffects, RandomEffects, StorageEffects};
use parlor_core::records::{self, SessionRecord, UserRecord};
use parlor_core::{ParlorError, Result, SessionId, SessionToken, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Sessions live for seven days from the exchange.
pub const SESSION_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Result of a successful session exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandoff {
    /// The account the session authenticates (created on first exchange)
    pub user: UserRecord,
    /// The bearer token the client must present from now on
    pub token: SessionToken,
    /// When the session stops authenticating
    pub expires_at: Timestamp,
}

/// Stateless auth engine.
///
/// # Example
///
/// ```ignore
/// let handler = AuthHandler::new();
/// let handoff = handler.exchange_session(&effects, "one-time-id").await?;
/// let user = handler.authenticate(&effects, &handoff.token).await?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthHandler;

impl AuthHandler {
    /// Create a new auth handler
    pub fn new() -> Self {
        Self
    }

    /// Exchange a one-time session id for a bearer session.
    ///
    /// Looks the id up with the provider, creates the account on first
    /// sight of the email, and mints the session. Any previous session for
    /// the account is dropped: one active session per member.
    pub async fn exchange_session<E>(&self, effects: &E, session_id: &str) -> Result<SessionHandoff>
    where
        E: StorageEffects + ClockEffects + RandomEffects + IdentityProviderEffects,
    {
        let provider_session = match effects.exchange_session_id(session_id).await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "session exchange refused");
                return Err(err.into());
            }
        };

        let user = self.create_or_get_user(effects, &provider_session).await?;
        let token = SessionToken::new(provider_session.session_token);
        let now = effects.now().await?;
        let expires_at = now + SESSION_TTL_MS;

        // Drop the previous session before minting the new one.
        let index_key = SessionRecord::user_index_key(user.id);
        if let Some(old_token) = records::get::<SessionToken, _>(effects, &index_key).await? {
            effects.remove(&SessionRecord::key(&old_token)).await?;
        }

        let session = SessionRecord {
            id: SessionId::from_uuid(effects.random_uuid().await),
            user_id: user.id,
            token: token.clone(),
            expires_at,
            created_at: now,
            is_active: true,
        };
        records::put(effects, &session.storage_key(), &session).await?;
        records::put(effects, &index_key, &token).await?;

        info!(user = %user.id, onboarded = user.onboarding_completed, "session established");

        Ok(SessionHandoff {
            user,
            token,
            expires_at,
        })
    }

    /// Resolve a bearer token to its account.
    ///
    /// Fails with `AuthRequired` for unknown, deactivated, or expired
    /// sessions; the caller cannot tell these apart, on purpose.
    pub async fn authenticate<E>(&self, effects: &E, token: &SessionToken) -> Result<UserRecord>
    where
        E: StorageEffects + ClockEffects,
    {
        let session: SessionRecord = records::get(effects, &SessionRecord::key(token))
            .await?
            .ok_or_else(|| ParlorError::auth_required("no session for token"))?;

        let now = effects.now().await?;
        if !session.is_valid_at(now) {
            return Err(ParlorError::auth_required("session inactive or expired"));
        }

        records::get(effects, &UserRecord::key(session.user_id))
            .await?
            .ok_or_else(|| ParlorError::auth_required("session user missing"))
    }

    /// Deactivate the session behind a token.
    ///
    /// Best-effort: an unknown token is not an error, and the record is
    /// kept (inactive) rather than deleted.
    pub async fn logout<E>(&self, effects: &E, token: &SessionToken) -> Result<()>
    where
        E: StorageEffects,
    {
        let key = SessionRecord::key(token);
        if let Some(mut session) = records::get::<SessionRecord, _>(effects, &key).await? {
            session.is_active = false;
            records::put(effects, &key, &session).await?;
            debug!(user = %session.user_id, "session deactivated");
        }
        Ok(())
    }

    /// Mark the authenticated member's onboarding complete, optionally
    /// updating the display name collected during the flow.
    ///
    /// Callers treat profile creation plus this flag as one logical
    /// transaction: if this step fails after the profile was created, the
    /// error must surface and the gate stays at onboarding-incomplete.
    pub async fn complete_onboarding<E>(
        &self,
        effects: &E,
        token: &SessionToken,
        name: Option<&str>,
    ) -> Result<UserRecord>
    where
        E: StorageEffects + ClockEffects,
    {
        let mut user = self.authenticate(effects, token).await?;
        user.onboarding_completed = true;
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            user.name = name.to_string();
        }
        records::put(effects, &user.storage_key(), &user).await?;
        info!(user = %user.id, "onboarding completed");
        Ok(user)
    }

    async fn create_or_get_user<E>(
        &self,
        effects: &E,
        provider_session: &crate::ProviderSession,
    ) -> Result<UserRecord>
    where
        E: StorageEffects + ClockEffects + RandomEffects,
    {
        let email_key = UserRecord::email_key(&provider_session.email);
        if let Some(existing_id) = records::get::<UserId, _>(effects, &email_key).await? {
            if let Some(user) = records::get(effects, &UserRecord::key(existing_id)).await? {
                return Ok(user);
            }
            // Index without a record means a previous write half-failed;
            // fall through and recreate.
            warn!(user = %existing_id, "email index pointed at a missing account");
        }

        let user = UserRecord {
            id: UserId::from_uuid(effects.random_uuid().await),
            email: provider_session.email.clone(),
            name: provider_session.name.clone(),
            picture: provider_session.picture.clone(),
            created_at: effects.now().await?,
            is_active: true,
            onboarding_completed: false,
        };
        records::put(effects, &user.storage_key(), &user).await?;
        records::put(effects, &email_key, &user.id).await?;
        info!(user = %user.id, "account created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::result::Result;
    use crate::provider::{ProviderError, ProviderSession};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parlor_core::effects::{ClockError, StorageError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct MockEffects {
        data: Mutex<HashMap<String, Vec<u8>>>,
        sessions: Mutex<HashMap<String, ProviderSession>>,
        uuid_counter: AtomicU64,
        time_ms: AtomicU64,
    }

    impl MockEffects {
        fn with_provider_session(session_id: &str, email: &str, token: &str) -> Self {
            let effects = Self::default();
            effects.sessions.lock().unwrap().insert(
                session_id.to_string(),
                ProviderSession {
                    id: "subject-1".into(),
                    email: email.into(),
                    name: "Ada".into(),
                    picture: None,
                    session_token: token.into(),
                },
            );
            effects
        }

        fn advance(&self, ms: u64) {
            self.time_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl StorageEffects for MockEffects {
        async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
            self.data.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn remove(&self, key: &str) -> Result<bool, StorageError> {
            Ok(self.data.lock().unwrap().remove(key).is_some())
        }

        async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
            let guard = self.data.lock().unwrap();
            Ok(guard
                .keys()
                .filter(|k| prefix.map(|p| k.starts_with(p)).unwrap_or(true))
                .cloned()
                .collect())
        }

        async fn exists(&self, key: &str) -> Result<bool, StorageError> {
            Ok(self.data.lock().unwrap().contains_key(key))
        }
    }

    #[async_trait]
    impl ClockEffects for MockEffects {
        async fn now(&self) -> Result<Timestamp, ClockError> {
            Ok(Timestamp::from_millis(
                self.time_ms.fetch_add(1, Ordering::SeqCst),
            ))
        }
    }

    #[async_trait]
    impl RandomEffects for MockEffects {
        async fn random_uuid(&self) -> Uuid {
            Uuid::from_u128(self.uuid_counter.fetch_add(1, Ordering::SeqCst) as u128 + 1)
        }
    }

    #[async_trait]
    impl IdentityProviderEffects for MockEffects {
        async fn exchange_session_id(
            &self,
            session_id: &str,
        ) -> Result<ProviderSession, ProviderError> {
            // One-time ids: a second exchange fails.
            self.sessions
                .lock()
                .unwrap()
                .remove(session_id)
                .ok_or_else(|| ProviderError::Rejected {
                    reason: "unknown session id".into(),
                })
        }
    }

    #[tokio::test]
    async fn exchange_creates_account_and_session() {
        let effects = MockEffects::with_provider_session("otp-1", "ada@example.com", "tok-1");
        let handler = AuthHandler::new();

        let handoff = handler.exchange_session(&effects, "otp-1").await.unwrap();
        assert_eq!(handoff.user.email, "ada@example.com");
        assert!(!handoff.user.onboarding_completed);

        let user = handler
            .authenticate(&effects, &handoff.token)
            .await
            .unwrap();
        assert_eq!(user.id, handoff.user.id);
    }

    #[tokio::test]
    async fn exchange_is_rejected_for_unknown_id() {
        let effects = MockEffects::default();
        let handler = AuthHandler::new();

        let err = handler
            .exchange_session(&effects, "bogus")
            .await
            .unwrap_err();
        assert_matches!(err, ParlorError::AuthRequired { .. });
    }

    #[tokio::test]
    async fn second_exchange_drops_the_first_token() {
        let effects = MockEffects::with_provider_session("otp-1", "ada@example.com", "tok-1");
        effects.sessions.lock().unwrap().insert(
            "otp-2".into(),
            ProviderSession {
                id: "subject-1".into(),
                email: "ada@example.com".into(),
                name: "Ada".into(),
                picture: None,
                session_token: "tok-2".into(),
            },
        );
        let handler = AuthHandler::new();

        let first = handler.exchange_session(&effects, "otp-1").await.unwrap();
        let second = handler.exchange_session(&effects, "otp-2").await.unwrap();
        assert_eq!(first.user.id, second.user.id);

        let err = handler.authenticate(&effects, &first.token).await.unwrap_err();
        assert_matches!(err, ParlorError::AuthRequired { .. });
        handler.authenticate(&effects, &second.token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_session_fails_closed() {
        let effects = MockEffects::with_provider_session("otp-1", "ada@example.com", "tok-1");
        let handler = AuthHandler::new();
        let handoff = handler.exchange_session(&effects, "otp-1").await.unwrap();

        effects.advance(SESSION_TTL_MS + 1);
        let err = handler
            .authenticate(&effects, &handoff.token)
            .await
            .unwrap_err();
        assert_matches!(err, ParlorError::AuthRequired { .. });
    }

    #[tokio::test]
    async fn logout_deactivates_without_deleting() {
        let effects = MockEffects::with_provider_session("otp-1", "ada@example.com", "tok-1");
        let handler = AuthHandler::new();
        let handoff = handler.exchange_session(&effects, "otp-1").await.unwrap();

        handler.logout(&effects, &handoff.token).await.unwrap();
        let err = handler
            .authenticate(&effects, &handoff.token)
            .await
            .unwrap_err();
        assert_matches!(err, ParlorError::AuthRequired { .. });

        // Record survives, inactive.
        let session: SessionRecord =
            records::get(&effects, &SessionRecord::key(&handoff.token))
                .await
                .unwrap()
                .unwrap();
        assert!(!session.is_active);

        // Logging out twice stays quiet.
        handler.logout(&effects, &handoff.token).await.unwrap();
    }

    #[tokio::test]
    async fn onboarding_flips_flag_and_updates_name() {
        let effects = MockEffects::with_provider_session("otp-1", "ada@example.com", "tok-1");
        let handler = AuthHandler::new();
        let handoff = handler.exchange_session(&effects, "otp-1").await.unwrap();

        let user = handler
            .complete_onboarding(&effects, &handoff.token, Some("  Ada Lovelace "))
            .await
            .unwrap();
        assert!(user.onboarding_completed);
        assert_eq!(user.name, "Ada Lovelace");

        // Blank names are ignored rather than erasing the provider name.
        let user = handler
            .complete_onboarding(&effects, &handoff.token, Some("   "))
            .await
            .unwrap();
        assert_eq!(user.name, "Ada Lovelace");
    }
}
