//! Auth gate state machine
//!
//! One explicit object owns the session lifecycle: resolve on entry,
//! check on demand, tear down on logout. Which top-level experience a
//! front end presents is a function of [`AuthState`] and nothing else;
//! there is no ambient session global anywhere.
//!
//! Failure policy: session resolution fails closed to the guest view.
//! A network error during a status check is not an error state; it is
//! `Anonymous`, and the app stays usable.

use parlor_api::{ApiClient, ClientConfig};
use parlor_core::records::UserRecord;
use parlor_core::{ParlorError, Result};
use parlor_profile::ProfileDraft;
use tracing::{debug, info, warn};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Session unresolved; nothing should render yet
    Loading,
    /// No session; guest experience
    Anonymous,
    /// Session resolved, onboarding not finished
    OnboardingRequired(UserRecord),
    /// Session resolved, full access
    Active(UserRecord),
}

impl AuthState {
    /// Split an authenticated user by the onboarding flag.
    pub fn from_user(user: UserRecord) -> Self {
        if user.onboarding_completed {
            Self::Active(user)
        } else {
            Self::OnboardingRequired(user)
        }
    }

    /// Whether a session is resolved (regardless of onboarding).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::OnboardingRequired(_) | Self::Active(_))
    }

    /// The signed-in member, if any.
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::OnboardingRequired(user) | Self::Active(user) => Some(user),
            _ => None,
        }
    }

    /// Stable lowercase tag for logging.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Anonymous => "anonymous",
            Self::OnboardingRequired(_) => "onboarding-required",
            Self::Active(_) => "active",
        }
    }
}

/// The session object a front end owns for its whole lifetime.
#[derive(Debug)]
pub struct AuthGate {
    state: AuthState,
    config: ClientConfig,
}

impl AuthGate {
    /// A fresh gate in `Loading`; call [`Self::resolve_session`] next.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            state: AuthState::Loading,
            config,
        }
    }

    /// Current state.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// The configuration this gate was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the session on app entry.
    ///
    /// When the entry URL carries a one-time id from the provider
    /// redirect, exchange it first; a successful exchange is the whole
    /// resolution. On failure, or with no id at all, fall back to
    /// [`Self::check_status`]. Never returns an error: resolution fails
    /// closed to `Anonymous`.
    pub async fn resolve_session<C>(&mut self, client: &C, one_time_id: Option<&str>) -> &AuthState
    where
        C: ApiClient + ?Sized,
    {
        if let Some(id) = one_time_id {
            self.state = AuthState::Loading;
            match client.exchange_session(id).await {
                Ok(handoff) => {
                    info!(user = %handoff.user.id, "session exchanged");
                    self.state = AuthState::from_user(handoff.user);
                    return &self.state;
                }
                Err(err) => {
                    warn!(error = %err, "session exchange failed, checking status instead");
                }
            }
        }
        self.check_status(client).await
    }

    /// Ask the backend who we are.
    ///
    /// Any failure (401, 404, network) lands in `Anonymous`. The guest
    /// view is the degraded mode; no error escapes to the caller.
    pub async fn check_status<C>(&mut self, client: &C) -> &AuthState
    where
        C: ApiClient + ?Sized,
    {
        self.state = match client.me().await {
            Ok(user) => AuthState::from_user(user),
            Err(err) => {
                debug!(error = %err, "status check failed, treating as guest");
                AuthState::Anonymous
            }
        };
        debug!(state = self.state.describe(), "session status resolved");
        &self.state
    }

    /// The provider URL to send the browser to for login.
    ///
    /// Side-effect free: the redirect round-trip re-enters at
    /// [`Self::resolve_session`] with a one-time id.
    pub fn login_redirect(&self) -> String {
        self.config.login_redirect_url()
    }

    /// End the session.
    ///
    /// The server call is best-effort; local state becomes `Anonymous`
    /// unconditionally so the UI is never stuck signed-in after a flaky
    /// logout.
    pub async fn logout<C>(&mut self, client: &C) -> &AuthState
    where
        C: ApiClient + ?Sized,
    {
        if let Err(err) = client.logout().await {
            warn!(error = %err, "server logout failed, clearing local session anyway");
        }
        self.state = AuthState::Anonymous;
        &self.state
    }

    /// Submit the onboarding profile and flip the flag, as one logical
    /// transaction.
    ///
    /// Profile creation and the completion flag are two calls; if the
    /// flag fails after the profile was created, the error surfaces and
    /// the state stays `OnboardingRequired`. A later retry skips the
    /// already-created profile (the engine answers `InvalidTransition`
    /// for it) and finishes the flag.
    pub async fn complete_onboarding<C>(
        &mut self,
        client: &C,
        draft: &ProfileDraft,
        name: Option<&str>,
    ) -> Result<()>
    where
        C: ApiClient + ?Sized,
    {
        if !matches!(self.state, AuthState::OnboardingRequired(_)) {
            return Err(ParlorError::invalid_transition(format!(
                "cannot complete onboarding while {}",
                self.state.describe()
            )));
        }

        match client.create_profile(draft).await {
            Ok(_) => {}
            // A profile left over from an earlier partial attempt; the
            // flag is what is still missing.
            Err(ParlorError::InvalidTransition { .. }) => {
                debug!("profile already exists, finishing the flag");
            }
            Err(err) => return Err(err),
        }

        let user = client.complete_onboarding(name).await?;
        info!(user = %user.id, "onboarding completed");
        self.state = AuthState::from_user(user);
        Ok(())
    }

    /// Forget everything and go back to `Loading`, ready for a fresh
    /// [`Self::resolve_session`].
    pub fn reset(&mut self) {
        self.state = AuthState::Loading;
    }
}
