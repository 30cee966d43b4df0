//! Shared account-data cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::profile::UserAccount;

/// Logical cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The signed-in user's account record.
    CurrentUserAccount,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CurrentUserAccount => write!(f, "user_account"),
        }
    }
}

/// Cache of account records shared with the rest of the client.
#[async_trait]
pub trait AccountCache: Send + Sync {
    async fn get(&self, key: CacheKey) -> Result<Option<UserAccount>, StoreError>;

    async fn set(&self, key: CacheKey, account: UserAccount) -> Result<(), StoreError>;
}

/// In-memory [`AccountCache`].
#[derive(Debug, Default)]
pub struct InMemoryAccountCache {
    entries: RwLock<HashMap<CacheKey, UserAccount>>,
}

impl InMemoryAccountCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AccountCache for InMemoryAccountCache {
    async fn get(&self, key: CacheKey) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CacheKey, account: UserAccount) -> Result<(), StoreError> {
        debug!(key = %key, user_id = %account.user_id, "Account cached");
        self.entries.write().await.insert(key, account);
        Ok(())
    }
}
