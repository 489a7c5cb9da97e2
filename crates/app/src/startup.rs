use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use services::{Clock, SurveyService};
use storage::repository::Storage;
use survey_core::model::{Catalog, SurveyKey};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::{Args, prepare_sqlite_file};
use crate::routes::router;

const PURGE_INTERVAL_SECS: u64 = 300;

/// Load surveys from a JSON catalog file, or the built-in pair.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog = Catalog::from_json_str(&raw)
        .with_context(|| format!("loading catalog {}", path.display()))?;
    info!(path = %path.display(), surveys = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Open SQLite storage when a database URL is configured, in-memory otherwise.
///
/// # Errors
///
/// Returns an error if the database cannot be created, opened or migrated.
pub async fn open_storage(args: &Args) -> anyhow::Result<Storage> {
    match args.database_url() {
        Some(url) => {
            prepare_sqlite_file(&url)?;
            let storage = Storage::sqlite(&url)
                .await
                .with_context(|| format!("opening {url}"))?;
            info!(%url, "using sqlite storage");
            Ok(storage)
        }
        None => {
            info!("using in-memory storage");
            Ok(Storage::in_memory())
        }
    }
}

/// Assemble the survey service from configuration.
///
/// Single-survey mode skips the completion guard so the survey can be retaken.
///
/// # Errors
///
/// Returns an error if the fixed survey is not in the catalog.
pub fn build_service(
    args: &Args,
    catalog: Catalog,
    storage: &Storage,
) -> anyhow::Result<SurveyService> {
    let service = SurveyService::from_storage(Clock::default(), Arc::new(catalog), storage)
        .with_choice_policy(args.choice_policy())
        .with_completion_ttl(Duration::seconds(args.completion_ttl_secs))
        .with_session_ttl(Duration::seconds(args.session_ttl_secs));

    let Some(raw) = args.fixed_survey.as_deref() else {
        return Ok(service);
    };
    let key = SurveyKey::new(raw);
    service
        .overview(&key)
        .with_context(|| format!("--survey {raw}"))?;
    info!(survey = %key, "serving a single survey");
    Ok(service.with_fixed_survey(key).without_completion_guard())
}

/// Periodically drop sessions and completion markers whose TTL has lapsed.
pub fn spawn_expiry_purger(storage: Storage, clock: Clock) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(PURGE_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            purge_expired(&storage, clock).await;
        }
    });
}

/// One purge pass over both stores. Failures are logged and retried next tick.
pub async fn purge_expired(storage: &Storage, clock: Clock) {
    let now = clock.now();
    match storage.sessions.purge_expired(now).await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "expired sessions purged"),
        Err(err) => warn!(error = %err, "session purge failed"),
    }
    match storage.completions.purge_expired(now).await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "expired completion markers purged"),
        Err(err) => warn!(error = %err, "completion marker purge failed"),
    }
}

/// Run the HTTP server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if startup fails or the listener cannot be bound.
pub async fn serve(args: Args) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let storage = open_storage(&args).await?;
    let service = build_service(&args, catalog, &storage)?;
    spawn_expiry_purger(storage.clone(), Clock::default());

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(addr = %listener.local_addr()?, "survey server listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
