//! Parlor Chat - conversation and message store
//!
//! A conversation exists only because a connection request was accepted;
//! this crate never creates one. It owns the ordered message log and the
//! derived unread counters: opening a conversation lazily loads history
//! and marks the counterpart's messages read, sending appends and bumps
//! the conversation's activity stamp.
//!
//! There is no push channel. Consumers poll or re-fetch on user action,
//! and the unread counter a counterpart sees only moves on their next
//! fetch.

#![forbid(unsafe_code)]

mod service;
mod view;

pub use service::MessagingHandler;
pub use view::ConversationSummary;
