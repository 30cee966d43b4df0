//! Polling controller: drives reconciliation attempts until the pending
//! profile fields land on the account, the attempt budget runs out, or the
//! backend reports a real failure.
//!
//! The controller owns one attempt stream at a time. Status is derived from
//! the phase and attempt count on every change and published on a
//! `watch` channel. Terminal side effects (cache write, clearing pending
//! fields) run under the state lock right after the phase flips to `Done`,
//! so re-evaluating a finished cycle never repeats them.

use std::sync::{Arc, Mutex as StdMutex};

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::attempt::{AttemptOutcome, Reconciler, ReconciliationAttempt};
use super::policy::{AttemptPolicy, RetryDecision};
use crate::account::{AccountCache, CacheKey, CatalogTranslator, HttpAccountClient};
use crate::config::ReconcileConfig;
use crate::profile::model::has_pending_content;
use crate::profile::{PendingProfileFields, PendingProfileStore};

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The account now carries the pending fields.
    Reconciled,
    /// There were no pending fields; no request was made.
    NothingToReconcile,
    /// Every attempt in the budget found no account.
    TimedOut,
    /// The backend rejected the patch.
    Failed { message: String },
}

/// Controller phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Polling,
    Done(Outcome),
}

/// Snapshot handed to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollingStatus {
    pub is_loading: bool,
    pub is_done: bool,
    pub is_timeout: bool,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Attempts resolved in the current cycle.
    pub attempts: u32,
}

impl PollingStatus {
    fn derive(phase: &Phase, attempts: u32) -> Self {
        let mut status = Self {
            attempts,
            ..Default::default()
        };
        match phase {
            Phase::Idle => {}
            Phase::Polling => status.is_loading = true,
            Phase::Done(outcome) => {
                status.is_done = true;
                match outcome {
                    Outcome::Reconciled | Outcome::NothingToReconcile => {}
                    Outcome::TimedOut => status.is_timeout = true,
                    Outcome::Failed { message } => {
                        status.is_error = true;
                        status.error_message = Some(message.clone());
                    }
                }
            }
        }
        status
    }
}

/// Collaborators the controller reads from and writes to.
#[derive(Clone)]
pub struct ControllerDeps {
    pub store: Arc<dyn PendingProfileStore>,
    pub cache: Arc<dyn AccountCache>,
    pub reconciler: Arc<dyn Reconciler>,
}

/// Attempt state of the current cycle.
#[derive(Debug, Default)]
struct Cycle {
    generation: u64,
    attempts: u32,
    latest: Option<AttemptOutcome>,
    decision: Option<RetryDecision>,
}

struct ControllerState {
    phase: Phase,
    cycle: Cycle,
}

struct Shared {
    id: Uuid,
    deps: ControllerDeps,
    policy: AttemptPolicy,
    state: Mutex<ControllerState>,
    status_tx: watch::Sender<PollingStatus>,
    task: StdMutex<Option<AbortHandle>>,
}

/// Reconciles pending sign-up fields with the backend account.
pub struct PollingController {
    shared: Arc<Shared>,
}

impl PollingController {
    /// Create the controller and run the initial evaluation.
    ///
    /// With no pending fields this already ends the flow: pending data is
    /// cleared and the status reports done.
    pub async fn new(deps: ControllerDeps, policy: AttemptPolicy) -> Self {
        let (status_tx, _rx) = watch::channel(PollingStatus::default());
        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            deps,
            policy,
            state: Mutex::new(ControllerState {
                phase: Phase::Idle,
                cycle: Cycle::default(),
            }),
            status_tx,
            task: StdMutex::new(None),
        });

        {
            let mut state = shared.state.lock().await;
            shared.evaluate(&mut state).await;
            shared.publish(&state);
        }

        Self { shared }
    }

    /// Build a controller that reconciles against the HTTP backend in `config`.
    pub async fn connect(
        config: &ReconcileConfig,
        store: Arc<dyn PendingProfileStore>,
        cache: Arc<dyn AccountCache>,
    ) -> crate::error::Result<Self> {
        config.validate()?;
        let reconciler = ReconciliationAttempt::new(
            HttpAccountClient::from_config(config),
            CatalogTranslator::default(),
        );
        let deps = ControllerDeps {
            store,
            cache,
            reconciler: Arc::new(reconciler),
        };
        Ok(Self::new(deps, AttemptPolicy::from_config(config)).await)
    }

    /// Begin a reconciliation cycle.
    ///
    /// Ignored while a cycle is running, and after a nothing-to-reconcile
    /// finish as long as the store still holds nothing. Otherwise this resets
    /// the attempt count and starts a fresh sequence.
    pub async fn start(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock().await;

        if state.phase == Phase::Polling {
            debug!(controller = %shared.id, "Reconciliation already running, start ignored");
            return;
        }

        let read = shared.deps.store.pending_fields().await;
        if state.phase == Phase::Done(Outcome::NothingToReconcile)
            && matches!(&read, Ok(fields) if !has_pending_content(fields.as_ref()))
        {
            debug!(controller = %shared.id, "Nothing to reconcile, start ignored");
            return;
        }

        let generation = state.cycle.generation + 1;
        state.cycle = Cycle {
            generation,
            ..Default::default()
        };
        state.phase = Phase::Idle;

        let fields = match read {
            Ok(fields) => fields,
            Err(e) => {
                warn!(controller = %shared.id, error = %e, "Failed to read pending profile fields");
                shared.complete(&mut state, Outcome::Failed { message: e.to_string() });
                shared.publish(&state);
                return;
            }
        };

        let Some(fields) = fields.filter(|f| f.has_content()) else {
            shared.finish_without_request(&mut state).await;
            shared.publish(&state);
            return;
        };

        state.phase = Phase::Polling;
        shared.publish(&state);
        info!(
            controller = %shared.id,
            cycle = generation,
            max_attempts = shared.policy.max_attempts(),
            "Reconciliation started"
        );

        let handle = tokio::spawn(run_cycle(Arc::clone(shared), generation, fields));
        if let Ok(mut task) = shared.task.lock() {
            if let Some(previous) = task.replace(handle.abort_handle()) {
                previous.abort();
            }
        }
    }

    /// Current status snapshot.
    pub fn status(&self) -> PollingStatus {
        self.shared.status_tx.borrow().clone()
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<PollingStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Wait until the current cycle reaches a terminal phase.
    pub async fn wait_done(&self) -> PollingStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| s.is_done).await {
            Ok(status) => status.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.status(),
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Ok(mut task) = self.shared.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

/// Sequential attempt loop for one cycle.
async fn run_cycle(shared: Arc<Shared>, generation: u64, fields: PendingProfileFields) {
    loop {
        let outcome = shared.deps.reconciler.attempt(&fields).await;
        match shared.observe(generation, outcome).await {
            Some(delay) => tokio::time::sleep(delay).await,
            None => return,
        }
    }
}

impl Shared {
    /// Record a resolved attempt. Returns the delay before the next attempt,
    /// or `None` when the loop should stop.
    async fn observe(
        &self,
        generation: u64,
        outcome: AttemptOutcome,
    ) -> Option<std::time::Duration> {
        let mut state = self.state.lock().await;

        if state.cycle.generation != generation || state.phase != Phase::Polling {
            debug!(controller = %self.id, cycle = generation, "Discarding outcome from inactive cycle");
            return None;
        }

        state.cycle.attempts += 1;
        let attempt = state.cycle.attempts;
        let decision = self.policy.decide(&outcome, attempt);
        debug!(
            controller = %self.id,
            cycle = generation,
            attempt,
            outcome = outcome.kind(),
            ?decision,
            "Attempt resolved"
        );
        state.cycle.latest = Some(outcome);
        state.cycle.decision = Some(decision);

        self.evaluate(&mut state).await;
        self.publish(&state);

        match (&state.phase, decision) {
            (Phase::Polling, RetryDecision::Retry { delay }) => Some(delay),
            _ => None,
        }
    }

    /// Apply the transition rules to the current state.
    async fn evaluate(&self, state: &mut ControllerState) {
        if matches!(state.phase, Phase::Done(_)) {
            return;
        }

        let fields = match self.deps.store.pending_fields().await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(controller = %self.id, error = %e, "Failed to read pending profile fields");
                self.complete(state, Outcome::Failed { message: e.to_string() });
                return;
            }
        };

        if !has_pending_content(fields.as_ref()) {
            self.finish_without_request(state).await;
            return;
        }

        if state.phase != Phase::Polling {
            return;
        }

        match (state.cycle.latest.take(), state.cycle.decision) {
            (None, _) => {}
            (Some(AttemptOutcome::NotYetProvisioned), Some(RetryDecision::Exhausted)) => {
                self.complete(state, Outcome::TimedOut);
            }
            (Some(AttemptOutcome::HardFailure { message }), _) => {
                warn!(controller = %self.id, message = %message, "Reconciliation failed");
                self.complete(state, Outcome::Failed { message });
            }
            (Some(AttemptOutcome::Success(account)), _) => {
                self.complete(state, Outcome::Reconciled);
                if let Err(e) = self.deps.cache.set(CacheKey::CurrentUserAccount, account).await {
                    warn!(controller = %self.id, error = %e, "Failed to cache account");
                }
                self.clear_pending().await;
            }
            (Some(AttemptOutcome::NotYetProvisioned), _) => {}
        }
    }

    async fn finish_without_request(&self, state: &mut ControllerState) {
        self.complete(state, Outcome::NothingToReconcile);
        self.clear_pending().await;
    }

    fn complete(&self, state: &mut ControllerState, outcome: Outcome) {
        info!(
            controller = %self.id,
            cycle = state.cycle.generation,
            attempts = state.cycle.attempts,
            outcome = ?outcome,
            "Reconciliation finished"
        );
        state.phase = Phase::Done(outcome);
    }

    async fn clear_pending(&self) {
        if let Err(e) = self.deps.store.clear_pending().await {
            warn!(controller = %self.id, error = %e, "Failed to clear pending profile fields");
        }
    }

    fn publish(&self, state: &ControllerState) {
        self.status_tx
            .send_replace(PollingStatus::derive(&state.phase, state.cycle.attempts));
    }
}
