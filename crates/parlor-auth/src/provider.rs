//! Identity provider contract
//!
//! The login round-trip leaves the app entirely: the browser is redirected
//! to the provider and comes back with a one-time session id in the URL.
//! The only thing the engine needs from the vendor is the exchange of that
//! id for the member's identity and a bearer token, captured here as a
//! single-method effect trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the provider hands back for a valid one-time session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Provider-side subject id (opaque to Parlor)
    pub id: String,
    /// Verified email address
    pub email: String,
    /// Display name as known to the provider
    pub name: String,
    /// Avatar URL, if the provider has one
    pub picture: Option<String>,
    /// Bearer token Parlor will store as the session token
    pub session_token: String,
}

/// Error type for provider exchanges
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The one-time id was unknown, expired, or already used
    #[error("provider rejected session id: {reason}")]
    Rejected {
        /// Why the exchange was refused
        reason: String,
    },

    /// The provider could not be reached
    #[error("provider unavailable: {reason}")]
    Unavailable {
        /// The transport failure
        reason: String,
    },
}

/// Exchange contract against the external identity provider.
#[async_trait]
pub trait IdentityProviderEffects: Send + Sync {
    /// Exchange a one-time session id for the member's identity.
    ///
    /// Ids are single-use: a second exchange of the same id must be
    /// rejected by the provider.
    async fn exchange_session_id(&self, session_id: &str)
        -> Result<ProviderSession, ProviderError>;
}

impl From<ProviderError> for parlor_core::ParlorError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected { reason } => parlor_core::ParlorError::auth_required(reason),
            ProviderError::Unavailable { reason } => parlor_core::ParlorError::network(reason),
        }
    }
}
