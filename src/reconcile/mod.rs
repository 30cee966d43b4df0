//! Reconciliation of sign-up profile fields with an account the backend
//! provisions asynchronously.
//!
//! - [`attempt`]: one PATCH, classified into an [`AttemptOutcome`].
//! - [`policy`]: whether and when to try again.
//! - [`controller`]: the start/stop guard, derived status and terminal side effects.

pub mod attempt;
pub mod controller;
pub mod policy;

pub use attempt::{AttemptOutcome, Reconciler, ReconciliationAttempt};
pub use controller::{ControllerDeps, Outcome, Phase, PollingController, PollingStatus};
pub use policy::{AttemptPolicy, RetryDecision};
