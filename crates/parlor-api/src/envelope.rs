//! Response envelope and wire error decoding
//!
//! Every endpoint answers `{success, message, data?}`. Failures carry an
//! optional machine-readable `kind` tag (the [`ParlorError::kind`] string)
//! next to the human-readable message, so clients rebuild the exact error
//! variant instead of pattern-matching on prose. When the tag is missing
//! (a proxy error page, an older server), the HTTP status decides.

use parlor_core::{ParlorError, Result};
use serde::{Deserialize, Serialize};

/// The `{success, message, data}` envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
    /// Payload, present on success for endpoints that return one
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope with a payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A successful envelope without a payload
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Unwrap the payload of a successful envelope.
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(ParlorError::invalid_request(self.message));
        }
        self.data
            .ok_or_else(|| ParlorError::serialization("successful envelope without data"))
    }
}

/// A failed HTTP exchange: status plus the decoded error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    /// HTTP status code
    pub status: u16,
    /// Machine-readable error tag, when the server sent one
    pub kind: Option<String>,
    /// Human-readable detail
    pub message: String,
}

/// Rebuild the error variant a failed exchange stands for.
pub fn decode_failure(failure: &ApiFailure) -> ParlorError {
    let message = failure.message.clone();
    if let Some(kind) = failure.kind.as_deref() {
        match kind {
            "auth_required" => return ParlorError::auth_required(message),
            "not_authorized" => return ParlorError::not_authorized(message),
            "invalid_transition" => return ParlorError::invalid_transition(message),
            "duplicate_request" => return ParlorError::duplicate_request(message),
            "invalid_request" => return ParlorError::invalid_request(message),
            "empty_message" => return ParlorError::EmptyMessage,
            "not_found" => return ParlorError::not_found(message),
            _ => {}
        }
    }
    match failure.status {
        401 => ParlorError::auth_required(message),
        403 => ParlorError::not_authorized(message),
        404 => ParlorError::not_found(message),
        400 => ParlorError::invalid_request(message),
        500..=599 => ParlorError::internal(message),
        _ => ParlorError::network(format!("unexpected status {}: {message}", failure.status)),
    }
}
