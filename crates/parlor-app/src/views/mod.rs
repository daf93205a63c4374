//! View state for front ends
//!
//! Pure, framework-free state with computed counts. The async methods
//! take an [`parlor_api::ApiClient`] reference per call, the same way the
//! engines take effects; nothing here caches another member's state
//! beyond the current view's lifetime.

pub mod chat;
pub mod connections;

pub use chat::{ChatState, ConversationLog, DeliveryStatus, OutgoingMessage};
pub use connections::ConnectionsState;
