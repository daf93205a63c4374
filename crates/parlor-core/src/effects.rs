//! Pure effect interfaces
//!
//! Engines are stateless and take an effect reference per call, so every
//! side channel (persistence, the clock, randomness) is injectable. Test
//! code swaps in deterministic implementations; production wiring provides
//! real ones. Traits stay minimal: only the operations the engines
//! actually issue.

use crate::time::Timestamp;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StorageError {
    /// Backend refused or failed the operation
    #[error("storage backend error: {reason}")]
    Backend {
        /// Backend failure description
        reason: String,
    },

    /// Stored bytes could not be produced or understood
    #[error("storage codec error: {reason}")]
    Codec {
        /// Codec failure description
        reason: String,
    },
}

/// Key/value persistence for engine records.
///
/// Keys are flat strings namespaced by record type (each record type in
/// [`crate::records`] builds its own); values are serialized records. `list_keys`
/// with a prefix is the only scan primitive; projections filter after
/// loading, the way a document store would.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Store a value under a key, replacing any previous value
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Retrieve the value stored under a key
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove a key, reporting whether it existed
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// List keys, optionally restricted to a prefix
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists without loading it
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Error type for clock operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ClockError {
    /// The time source is unavailable
    #[error("clock unavailable: {reason}")]
    Unavailable {
        /// Why the clock could not be read
        reason: String,
    },
}

/// Wall-clock time for record stamps and session expiry.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current time
    async fn now(&self) -> Result<Timestamp, ClockError>;
}

/// Randomness for fresh identifiers.
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// A fresh UUID
    async fn random_uuid(&self) -> Uuid;
}

impl From<StorageError> for crate::ParlorError {
    fn from(err: StorageError) -> Self {
        crate::ParlorError::storage(err.to_string())
    }
}

impl From<ClockError> for crate::ParlorError {
    fn from(err: ClockError) -> Self {
        crate::ParlorError::internal(format!("clock error: {err}"))
    }
}
