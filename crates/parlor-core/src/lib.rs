//! Parlor Core - shared foundation for the meetup-network engines
//!
//! This crate provides the types every other Parlor crate builds on. It
//! contains no application logic of its own, only:
//!
//! - Identifier newtypes for the entities in the system
//! - The unified [`ParlorError`] type and its [`Result`] alias
//! - Millisecond [`Timestamp`]s
//! - Pure effect interfaces for storage, clock, and randomness
//! - The persistent record types shared by the engines, with their
//!   storage-key scheme
//!
//! Engines (`parlor-auth`, `parlor-connections`, `parlor-chat`, …) are
//! stateless handlers that take effect references per call; all mutable
//! state lives behind [`effects::StorageEffects`].

#![forbid(unsafe_code)]

/// User, request, conversation, message, and session identifiers
pub mod identifiers;

/// Unified error handling
pub mod errors;

/// Millisecond timestamps
pub mod time;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Skip/limit pagination for list projections
pub mod pagination;

/// Persistent record types and the storage-key scheme
pub mod records;

pub use errors::{ParlorError, Result};
pub use identifiers::{ConversationId, MessageId, RequestId, SessionId, SessionToken, UserId};
pub use pagination::{Page, PageInfo, Paged};
pub use time::Timestamp;
