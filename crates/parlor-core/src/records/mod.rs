//! Persistent record types and the storage-key scheme
//!
//! Records are the documents the engines agree on: users, profiles,
//! sessions, connection requests, conversations, and messages. They
//! serialize as JSON behind [`StorageEffects`] under flat, prefix-scannable
//! keys, so any engine can read another domain's records the way route
//! handlers share a document store.
//!
//! Mutation discipline: every write goes through an engine operation;
//! records themselves only carry predicates and key builders.

mod connection;
mod messaging;
mod profile;
mod session;
mod user;

pub use connection::{ConnectionRecord, ConnectionStatus};
pub use messaging::{ConversationRecord, MessageRecord};
pub use profile::{ContactPreference, ProfileRecord};
pub use session::SessionRecord;
pub use user::UserRecord;

use crate::effects::StorageEffects;
use crate::{ParlorError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Store a record under a key, replacing any previous value.
pub async fn put<T, E>(effects: &E, key: &str, record: &T) -> Result<()>
where
    T: Serialize,
    E: StorageEffects + ?Sized,
{
    let bytes = serde_json::to_vec(record)
        .map_err(|e| ParlorError::serialization(format!("encoding {key}: {e}")))?;
    effects.store(key, bytes).await?;
    Ok(())
}

/// Load the record stored under a key, if any.
pub async fn get<T, E>(effects: &E, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    E: StorageEffects + ?Sized,
{
    match effects.retrieve(key).await? {
        Some(bytes) => {
            let record = serde_json::from_slice(&bytes)
                .map_err(|e| ParlorError::serialization(format!("decoding {key}: {e}")))?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Load every record under a key prefix.
///
/// This is the scan primitive behind the list projections; callers sort
/// and window the result themselves.
pub async fn scan<T, E>(effects: &E, prefix: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    E: StorageEffects + ?Sized,
{
    let keys = effects.list_keys(Some(prefix)).await?;
    let mut records = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(record) = get(effects, &key).await? {
            records.push(record);
        }
    }
    Ok(records)
}
