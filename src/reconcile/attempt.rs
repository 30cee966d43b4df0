//! A single reconciliation attempt and its classification.

use async_trait::async_trait;
use tracing::debug;

use crate::account::{AccountApi, ErrorTranslator};
use crate::profile::{PendingProfileFields, UserAccount};

/// Result of one attempt to patch the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The account was patched; carries the normalized record.
    Success(UserAccount),
    /// The backend has not created the account yet.
    NotYetProvisioned,
    /// Any other failure. `message` is ready for display.
    HardFailure { message: String },
}

impl AttemptOutcome {
    pub fn is_not_yet_provisioned(&self) -> bool {
        matches!(self, Self::NotYetProvisioned)
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NotYetProvisioned => "not_yet_provisioned",
            Self::HardFailure { .. } => "hard_failure",
        }
    }
}

/// Performs one attempt. Implementations never retry.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Try to attach `fields` to the account. Callers only pass fields with content.
    async fn attempt(&self, fields: &PendingProfileFields) -> AttemptOutcome;
}

/// [`Reconciler`] backed by the account API.
pub struct ReconciliationAttempt<A, T> {
    api: A,
    translator: T,
}

impl<A, T> ReconciliationAttempt<A, T>
where
    A: AccountApi,
    T: ErrorTranslator,
{
    pub fn new(api: A, translator: T) -> Self {
        Self { api, translator }
    }
}

#[async_trait]
impl<A, T> Reconciler for ReconciliationAttempt<A, T>
where
    A: AccountApi,
    T: ErrorTranslator,
{
    async fn attempt(&self, fields: &PendingProfileFields) -> AttemptOutcome {
        match self.api.patch_account(&fields.to_patch()).await {
            Ok(account) => AttemptOutcome::Success(account),
            Err(e) if e.is_not_found() => {
                debug!("Account not provisioned yet");
                AttemptOutcome::NotYetProvisioned
            }
            Err(e) => {
                debug!(error = %e, "Account patch failed");
                AttemptOutcome::HardFailure {
                    message: self.translator.message(e.code()),
                }
            }
        }
    }
}
