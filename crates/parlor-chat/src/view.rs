//! Conversation list projections

use parlor_core::records::ConversationRecord;
use parlor_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A conversation as shown in the list view: the counterpart's identity,
/// a preview of the newest message, and the viewer's unread count.
///
/// Counts are computed from the message log at read time, never stored,
/// so they cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The conversation itself
    pub conversation: ConversationRecord,
    /// The other participant
    pub other_user_id: UserId,
    /// Counterpart display name
    pub other_name: String,
    /// Counterpart email
    pub other_email: String,
    /// Counterpart avatar
    pub other_picture: Option<String>,
    /// Body of the newest message, if any
    pub last_message: Option<String>,
    /// Newest activity: last message time, or creation time when empty
    pub last_activity: Timestamp,
    /// Messages the viewer has not read yet
    pub unread_count: usize,
}
