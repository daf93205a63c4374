//! Parlor API - the REST contract between front ends and the engines
//!
//! Everything a front end exchanges with the backend is typed here: the
//! `{success, message, data}` envelope, the error-kind tags that survive
//! the wire, the [`ApiClient`] trait with one method per endpoint, and the
//! client configuration (backend base URL, identity-provider redirect,
//! environment).
//!
//! Payload types are the engine views themselves (a workspace-internal
//! contract has no reason to duplicate them), so a client implementation
//! deserializes straight into `UserRecord`, `RequestView`,
//! `ConversationSummary`, and friends.

#![forbid(unsafe_code)]

mod client;
mod config;
mod envelope;
mod routes;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError, Environment};
pub use envelope::{decode_failure, ApiFailure, ApiResponse};
pub use routes::Endpoint;
