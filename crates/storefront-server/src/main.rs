//! Storefront server binary.

use std::sync::Arc;

use anyhow::Context;
use storefront_server::{
    AppState, Settings,
    cache::build_key_store,
    metrics::init_metrics,
    payments::{PaymentGateway, SandboxGateway, StripeGateway},
    run_server,
};
use storefront_store::{LocalObjectStore, MemoryStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr = settings.addr()?;

    tracing::info!(
        "Starting Storefront Server v{}",
        storefront_server::version()
    );

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let key_store = build_key_store(&settings.cache).await;
    tracing::info!(backend = key_store.backend_name(), "Cache ready");

    tokio::fs::create_dir_all(&settings.uploads.dir)
        .await
        .with_context(|| format!("failed to create {}", settings.uploads.dir.display()))?;
    let objects = LocalObjectStore::new(&settings.uploads.dir, &settings.uploads.public_prefix);

    let payments: Arc<dyn PaymentGateway> = match &settings.payments.stripe_secret_key {
        Some(key) if !key.is_empty() => Arc::new(StripeGateway::new(
            &settings.payments.stripe_api_base,
            key,
        )),
        _ => {
            tracing::warn!("No Stripe key configured, using the sandbox payment gateway");
            Arc::new(SandboxGateway)
        }
    };

    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(objects),
        key_store,
        payments,
    )
    .with_settings(&settings);

    run_server(addr, &settings, state, prometheus_handle).await?;

    Ok(())
}
