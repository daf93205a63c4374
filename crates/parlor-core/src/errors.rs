//! Unified error system for the Parlor core
//!
//! A single error type covers every engine so call sites can match
//! exhaustively instead of inspecting response shapes. The taxonomy follows
//! the recovery policy: validation kinds are handled inline at the call
//! site, authorization and transition kinds surface to the user, network
//! kinds degrade reads to an empty/guest view. Nothing here is fatal to the
//! process.

use serde::{Deserialize, Serialize};

/// Unified error type for all Parlor operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ParlorError {
    /// No session, or the session is invalid/expired
    #[error("authentication required: {message}")]
    AuthRequired {
        /// What was attempted without a valid session
        message: String,
    },

    /// Session is valid but the actor may not touch the target entity
    #[error("not authorized: {message}")]
    NotAuthorized {
        /// Which permission was missing
        message: String,
    },

    /// A state-machine precondition was violated
    #[error("invalid transition: {message}")]
    InvalidTransition {
        /// The transition that was refused
        message: String,
    },

    /// An active connection request already exists between the pair
    #[error("duplicate request: {message}")]
    DuplicateRequest {
        /// The pair the duplicate was detected for
        message: String,
    },

    /// Input validation failed
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the input
        message: String,
    },

    /// Message content trimmed to nothing
    #[error("message content is empty")]
    EmptyMessage,

    /// Entity absent. On an own-profile fetch this is a signal
    /// (onboarding incomplete), not a failure.
    #[error("not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// Transport-level failure
    #[error("network error: {message}")]
    Network {
        /// The transport failure
        message: String,
    },

    /// Storage backend failure
    #[error("storage error: {message}")]
    Storage {
        /// The backend failure
        message: String,
    },

    /// Record could not be encoded or decoded
    #[error("serialization error: {message}")]
    Serialization {
        /// The codec failure
        message: String,
    },

    /// Internal invariant breakage
    #[error("internal error: {message}")]
    Internal {
        /// The broken invariant
        message: String,
    },
}

impl ParlorError {
    /// Create an authentication-required error
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::AuthRequired {
            message: message.into(),
        }
    }

    /// Create a not-authorized error
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            message: message.into(),
        }
    }

    /// Create an invalid-transition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }

    /// Create a duplicate-request error
    pub fn duplicate_request(message: impl Into<String>) -> Self {
        Self::DuplicateRequest {
            message: message.into(),
        }
    }

    /// Create an invalid-request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for input-validation failures the caller recovers from inline,
    /// without retrying the operation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::EmptyMessage | Self::DuplicateRequest { .. }
        )
    }

    /// True for failures that may resolve on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Storage { .. })
    }

    /// Stable lowercase tag for logging and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthRequired { .. } => "auth_required",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DuplicateRequest { .. } => "duplicate_request",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::EmptyMessage => "empty_message",
            Self::NotFound { .. } => "not_found",
            Self::Network { .. } => "network",
            Self::Storage { .. } => "storage",
            Self::Serialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result alias used across all Parlor crates
pub type Result<T> = std::result::Result<T, ParlorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_kinds_are_recoverable_inline() {
        assert!(ParlorError::EmptyMessage.is_validation());
        assert!(ParlorError::duplicate_request("a-b").is_validation());
        assert!(!ParlorError::not_authorized("x").is_validation());
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ParlorError::auth_required("").kind(), "auth_required");
        assert_eq!(ParlorError::EmptyMessage.kind(), "empty_message");
    }
}
