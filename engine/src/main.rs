// Engine main entry point
use anyhow::Context;
use engine::config::settings::{EngineSettings, CONFIG_PATH_ENV};
use engine::data::{BinanceKlineProvider, CsvCandleProvider, MarketDataProvider};
use engine::notify::TelegramNotifier;
use engine::services::{Scheduler, SignalService};
use engine::storage::SqliteSignalStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting signal engine...");

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let settings = EngineSettings::load(config_path.as_deref()).context("Failed to load engine settings")?;

    let provider: Arc<dyn MarketDataProvider> = match &settings.csv_path {
        Some(path) => Arc::new(CsvCandleProvider::new(path, settings.candle_limit)),
        None => Arc::new(BinanceKlineProvider::new(
            &settings.binance,
            &settings.symbol,
            settings.timeframe,
            settings.candle_limit,
        )?),
    };
    info!(
        source = %provider.describe(),
        interval_secs = settings.poll_interval_secs,
        "Candle source configured"
    );

    let mut service = SignalService::new(provider, settings.strategy.clone(), &settings.dedup);

    if let Some(storage) = &settings.storage {
        let store = SqliteSignalStore::open(&storage.path)
            .with_context(|| format!("Failed to open signal store at {}", storage.path.display()))?;
        info!(path = %storage.path.display(), "Signal store ready");
        service = service.with_store(Arc::new(store));
    }

    if let Some(telegram) = &settings.telegram {
        service = service.with_notifier(Arc::new(TelegramNotifier::new(telegram)?));
        info!(chat_id = %telegram.chat_id, "Telegram notifications enabled");
    }

    service.prime_from_store().await;

    let scheduler = Scheduler::new(Duration::from_secs(settings.poll_interval_secs));
    scheduler
        .run_until(&service, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Signal engine stopped");
    Ok(())
}
