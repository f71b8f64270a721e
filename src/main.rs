// Monitor worker
//
// Loads settings from the environment, launches one shared Chromium and
// processes every stored monitor. Runs once and exits unless
// WATCH_INTERVAL_SECS asks for periodic runs.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use webwatcher::browser::CleanupResult;
use webwatcher::{
    ChromiumContextFactory, GeminiSummarizer, MonitorOutcome, Settings, SqliteMonitorStore,
    WatchEngine, WebhookNotifier, launch_browser, run_periodically,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;

    let Some(interval) = settings.run_interval else {
        return run_once(&settings).await;
    };

    info!("Running every {}s", interval.as_secs());
    let settings = &settings;
    run_periodically(interval, shutdown_signal(), move || async move {
        if let Err(e) = run_once(settings).await {
            error!("Run failed: {e:#}");
        }
    })
    .await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn run_once(settings: &Settings) -> Result<()> {
    let store = Arc::new(
        SqliteMonitorStore::connect(&settings.database_url)
            .await
            .context("Failed to open monitor store")?,
    );
    let summarizer = Arc::new(GeminiSummarizer::new(
        settings.gemini_api_key.clone(),
        &settings.gemini_model,
        &settings.gemini_base_url,
    )?);
    let notifier = Arc::new(
        WebhookNotifier::new(&settings.notify_base_url, settings.webhook_secret.clone())
            .context("Failed to build webhook client")?,
    );

    let browser = launch_browser(settings.engine.headless(), settings.engine.user_agent())
        .await
        .context("Failed to launch browser")?;
    let contexts = Arc::new(ChromiumContextFactory::new(browser.browser()?, &settings.engine));

    let engine = WatchEngine::new(
        &settings.engine,
        store.clone(),
        contexts,
        summarizer,
        notifier,
    );
    let result = engine.run().await;
    drop(engine);

    if let CleanupResult::PartialFailure(errors) = browser.shutdown().await {
        warn!("Browser cleanup incomplete: {}", errors.join("; "));
    }
    store.close().await;

    let report = result?;
    info!("{}", report.summary_line());
    for failure in report.failures() {
        if let MonitorOutcome::Failed { reason } = &failure.outcome {
            warn!("Monitor {} failed: {reason}", failure.monitor_id);
        }
    }
    Ok(())
}
