//! Parlor Auth - session lifecycle engine
//!
//! Exchanges a one-time id from the identity provider for a bearer
//! session, resolves tokens to accounts, and flips the onboarding flag.
//! The provider itself sits behind [`IdentityProviderEffects`], so the
//! engine never knows which OAuth vendor is on the other side.

#![forbid(unsafe_code)]

mod provider;
mod service;

pub use provider::{IdentityProviderEffects, ProviderError, ProviderSession};
pub use service::{AuthHandler, SessionHandoff, SESSION_TTL_MS};
