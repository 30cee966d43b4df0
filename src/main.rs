use anyhow::Context;

use signup_reconcile::account::{AccountCache, CacheKey, InMemoryAccountCache};
use signup_reconcile::config::ReconcileConfig;
use signup_reconcile::profile::{Currency, Language, PendingProfileFields, RegistrationStore};
use signup_reconcile::reconcile::PollingController;

/// Read the pending sign-up fields from the environment.
fn pending_from_env() -> PendingProfileFields {
    let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    PendingProfileFields {
        first_name: var("SIGNUP_FIRST_NAME"),
        last_name: var("SIGNUP_LAST_NAME"),
        language: var("SIGNUP_LANGUAGE").map(|l| Language::parse(Some(&l))),
        currency: var("SIGNUP_CURRENCY").map(|c| Currency::parse(Some(&c))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ReconcileConfig::from_env().context("invalid configuration")?;

    eprintln!("signup-reconcile v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base_url);
    eprintln!(
        "   Budget: {} attempts, {:?} apart\n",
        config.max_attempts, config.retry_delay
    );

    let store = RegistrationStore::with_pending(pending_from_env());
    store.set_sign_up_flow(true).await;
    let cache = InMemoryAccountCache::new();

    let controller = PollingController::connect(&config, store.clone(), cache.clone()).await?;
    let mut updates = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let status = updates.borrow_and_update().clone();
            tracing::info!(
                loading = status.is_loading,
                done = status.is_done,
                attempts = status.attempts,
                "Status changed"
            );
        }
    });

    controller.start().await;
    let status = controller.wait_done().await;
    watcher.abort();

    if status.is_timeout {
        anyhow::bail!(
            "account was not provisioned after {} attempts; profile fields kept for a retry",
            status.attempts
        );
    }
    if let Some(message) = status.error_message {
        anyhow::bail!("reconciliation failed: {message}");
    }

    match cache.get(CacheKey::CurrentUserAccount).await? {
        Some(account) => eprintln!("Registration complete for {}.", account.email),
        None => eprintln!("Registration complete, nothing to update."),
    }
    Ok(())
}
