//! Pending-profile storage and the sign-up flow flags that travel with it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::PendingProfileFields;
use crate::error::StoreError;

/// Read/clear access to the profile fields entered at sign-up.
#[async_trait]
pub trait PendingProfileStore: Send + Sync {
    /// Current pending fields, if any were recorded.
    async fn pending_fields(&self) -> Result<Option<PendingProfileFields>, StoreError>;

    /// Drop the pending fields.
    async fn clear_pending(&self) -> Result<(), StoreError>;
}

/// Snapshot of the registration flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    pub pending_fields: Option<PendingProfileFields>,
    /// The user came through the sign-up form rather than sign-in.
    pub is_sign_up_flow: bool,
    /// The identity provider finished its part of the flow.
    pub is_auth_complete: bool,
    pub is_user_authenticated: bool,
}

/// In-memory registration store.
#[derive(Debug, Default)]
pub struct RegistrationStore {
    state: RwLock<RegistrationState>,
}

impl RegistrationStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a store that already holds pending fields.
    pub fn with_pending(fields: PendingProfileFields) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(RegistrationState {
                pending_fields: Some(fields),
                ..Default::default()
            }),
        })
    }

    pub async fn set_pending_fields(&self, fields: PendingProfileFields) {
        self.state.write().await.pending_fields = Some(fields);
    }

    pub async fn set_sign_up_flow(&self, is_sign_up: bool) {
        self.state.write().await.is_sign_up_flow = is_sign_up;
    }

    pub async fn set_auth_complete(&self) {
        self.state.write().await.is_auth_complete = true;
    }

    pub async fn set_user_authenticated(&self) {
        self.state.write().await.is_user_authenticated = true;
    }

    /// Return to the initial state (signed out, nothing pending).
    pub async fn reset(&self) {
        *self.state.write().await = RegistrationState::default();
        debug!("Registration store reset");
    }

    pub async fn snapshot(&self) -> RegistrationState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl PendingProfileStore for RegistrationStore {
    async fn pending_fields(&self) -> Result<Option<PendingProfileFields>, StoreError> {
        Ok(self.state.read().await.pending_fields.clone())
    }

    async fn clear_pending(&self) -> Result<(), StoreError> {
        self.state.write().await.pending_fields = None;
        debug!("Pending profile fields cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max() -> PendingProfileFields {
        PendingProfileFields {
            first_name: Some("Max".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn set_and_clear_pending() {
        let store = RegistrationStore::new();
        assert!(store.pending_fields().await.unwrap().is_none());

        store.set_pending_fields(max()).await;
        assert_eq!(store.pending_fields().await.unwrap(), Some(max()));

        store.clear_pending().await.unwrap();
        assert!(store.pending_fields().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_keeps_flow_flags() {
        let store = RegistrationStore::with_pending(max());
        store.set_sign_up_flow(true).await;
        store.set_auth_complete().await;

        store.clear_pending().await.unwrap();

        let state = store.snapshot().await;
        assert!(state.pending_fields.is_none());
        assert!(state.is_sign_up_flow);
        assert!(state.is_auth_complete);
        assert!(!state.is_user_authenticated);
    }

    #[tokio::test]
    async fn reset_restores_initial_state() {
        let store = RegistrationStore::with_pending(max());
        store.set_sign_up_flow(true).await;
        store.set_user_authenticated().await;

        store.reset().await;
        assert_eq!(store.snapshot().await, RegistrationState::default());
    }
}
