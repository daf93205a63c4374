//! Mock effects implementation for deterministic testing
//!
//! Uses `std::sync::Mutex` because this is test infrastructure: sections
//! are short, nothing holds a guard across an await, and the simpler
//! synchronous API keeps tests readable.

use async_trait::async_trait;
use parlor_auth::{IdentityProviderEffects, ProviderError, ProviderSession};
use parlor_core::effects::{
    ClockEffects, ClockError, RandomEffects, StorageEffects, StorageError,
};
use parlor_core::Timestamp;
use rand::RngCore;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug)]
struct MockState {
    rng: ChaCha20Rng,
    storage: HashMap<String, Vec<u8>>,
    now_ms: u64,
    provider_sessions: HashMap<String, ProviderSession>,
    provider_offline: bool,
}

/// Deterministic implementation of every effect trait the engines use.
///
/// Clones share state, so one `MockEffects` can back any number of
/// engine handles and [`crate::InProcessApi`] clients.
#[derive(Debug, Clone)]
pub struct MockEffects {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockEffects {
    fn default() -> Self {
        Self::with_seed(42)
    }
}

impl MockEffects {
    /// A mock with the default seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose ids derive from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                rng: ChaCha20Rng::seed_from_u64(seed),
                storage: HashMap::new(),
                // Some arbitrary morning, far from zero so expiry math
                // never underflows.
                now_ms: 1_700_000_000_000,
                provider_sessions: HashMap::new(),
                provider_offline: false,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, ms: u64) {
        self.lock().now_ms += ms;
    }

    /// Script a one-time session id at the identity provider.
    pub fn register_provider_session(&self, one_time_id: &str, session: ProviderSession) {
        self.lock()
            .provider_sessions
            .insert(one_time_id.to_string(), session);
    }

    /// Take the provider down (exchanges fail `Unavailable`).
    pub fn set_provider_offline(&self, offline: bool) {
        self.lock().provider_offline = offline;
    }
}

#[async_trait]
impl StorageEffects for MockEffects {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.lock().storage.insert(key.to_string(), value);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock().storage.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock().storage.remove(key).is_some())
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let guard = self.lock();
        let mut keys: Vec<String> = guard
            .storage
            .keys()
            .filter(|k| prefix.map(|p| k.starts_with(p)).unwrap_or(true))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock().storage.contains_key(key))
    }
}

#[async_trait]
impl ClockEffects for MockEffects {
    async fn now(&self) -> Result<Timestamp, ClockError> {
        let mut guard = self.lock();
        // Each read ticks one millisecond so no two stamps collide.
        let now = guard.now_ms;
        guard.now_ms += 1;
        Ok(Timestamp::from_millis(now))
    }
}

#[async_trait]
impl RandomEffects for MockEffects {
    async fn random_uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.lock().rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

#[async_trait]
impl IdentityProviderEffects for MockEffects {
    async fn exchange_session_id(
        &self,
        session_id: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let mut guard = self.lock();
        if guard.provider_offline {
            return Err(ProviderError::Unavailable {
                reason: "provider unreachable".into(),
            });
        }
        // One-time ids: the exchange consumes the entry.
        guard
            .provider_sessions
            .remove(session_id)
            .ok_or_else(|| ProviderError::Rejected {
                reason: "unknown or already-used session id".into(),
            })
    }
}
