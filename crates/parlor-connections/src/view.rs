//! Request list projections

use parlor_core::effects::StorageEffects;
use parlor_core::records::{self, ConnectionRecord, UserRecord};
use parlor_core::{ParlorError, Result};
use serde::{Deserialize, Serialize};

/// A connection request joined with both members' display data, as shown
/// in the received/sent/established lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    /// The request itself
    pub request: ConnectionRecord,
    /// Sender display name
    pub sender_name: String,
    /// Sender email
    pub sender_email: String,
    /// Sender avatar
    pub sender_picture: Option<String>,
    /// Receiver display name
    pub receiver_name: String,
    /// Receiver email
    pub receiver_email: String,
    /// Receiver avatar
    pub receiver_picture: Option<String>,
}

impl RequestView {
    /// Join a request with its two accounts.
    pub(crate) async fn assemble<E>(effects: &E, request: ConnectionRecord) -> Result<Self>
    where
        E: StorageEffects,
    {
        let sender: UserRecord = records::get(effects, &UserRecord::key(request.sender_id))
            .await?
            .ok_or_else(|| {
                ParlorError::internal(format!("request without sender: {}", request.id))
            })?;
        let receiver: UserRecord = records::get(effects, &UserRecord::key(request.receiver_id))
            .await?
            .ok_or_else(|| {
                ParlorError::internal(format!("request without receiver: {}", request.id))
            })?;
        Ok(Self {
            request,
            sender_name: sender.name,
            sender_email: sender.email,
            sender_picture: sender.picture,
            receiver_name: receiver.name,
            receiver_email: receiver.email,
            receiver_picture: receiver.picture,
        })
    }
}
