// engine/src/services/signal_service/mod.rs
// One pipeline run: fetch candles, evaluate the crossover strategy, report any signal.

pub mod report;

pub use report::{notification_text, report_signal, ReportStatus};

use crate::data::{validate_candles, MarketDataProvider};
use crate::error::EngineResult;
use crate::notify::Notifier;
use crate::signals::{analyze, DedupSettings, DuplicateGuard, StrategySettings};
use crate::storage::SignalStore;
use chrono::Utc;
use shared::models::Signal;
use shared::utils::format_timestamp;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A new signal was detected and handed to the collaborators.
    Signalled { signal: Signal, report: ReportStatus },
    /// The detector fired but the duplicate guard already reported this signal.
    Suppressed(Signal),
    NoSignal,
    /// Another run was still in flight.
    Skipped,
}

pub struct SignalService {
    provider: Arc<dyn MarketDataProvider>,
    store: Option<Arc<dyn SignalStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    strategy: StrategySettings,
    guard: Mutex<DuplicateGuard>,
    in_flight: Mutex<()>,
}

impl SignalService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        strategy: StrategySettings,
        dedup: &DedupSettings,
    ) -> Self {
        SignalService {
            provider,
            store: None,
            notifier: None,
            strategy,
            guard: Mutex::new(DuplicateGuard::new(dedup)),
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SignalStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Loads the last stored signal into the duplicate guard. A storage failure
    /// only costs deduplication across the restart, so it is logged and ignored.
    pub async fn prime_from_store(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.latest().await {
            Ok(Some(record)) => {
                tracing::info!(kind = %record.kind, at = %format_timestamp(&record.timestamp), "Primed duplicate guard from last stored signal");
                self.guard.lock().await.prime(&record);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Could not read last stored signal"),
        }
    }

    /// Runs the pipeline unless a previous run is still going, in which case it returns `Skipped`.
    pub async fn run_once(&self) -> EngineResult<RunOutcome> {
        let Ok(_running) = self.in_flight.try_lock() else {
            tracing::warn!("Previous pipeline run still in flight; skipping");
            return Ok(RunOutcome::Skipped);
        };

        let span = tracing::info_span!("pipeline_run", run_id = %Uuid::new_v4());
        self.run_pipeline().instrument(span).await
    }

    async fn run_pipeline(&self) -> EngineResult<RunOutcome> {
        let candles = self.provider.fetch_candles().await?;
        validate_candles(&candles)?;
        tracing::debug!(source = %self.provider.describe(), count = candles.len(), "Candles fetched");

        let analysis = analyze(&candles, &self.strategy);
        tracing::debug!(
            ema_fast = ?analysis.ema_fast,
            ema_slow = ?analysis.ema_slow,
            rsi = ?analysis.rsi,
            "Indicators computed"
        );

        let Some(signal) = analysis.signal else {
            tracing::info!("[{}] No signal", format_timestamp(&Utc::now()));
            return Ok(RunOutcome::NoSignal);
        };

        if self.guard.lock().await.is_duplicate(&signal) {
            tracing::info!(kind = %signal.kind, at = %format_timestamp(&signal.timestamp), "Duplicate signal suppressed");
            return Ok(RunOutcome::Suppressed(signal));
        }

        tracing::info!("{}", signal);
        let report = report_signal(&signal, self.store.as_ref(), self.notifier.as_ref()).await;
        if report.delivered() {
            self.guard.lock().await.commit(&signal);
        } else {
            tracing::warn!(kind = %signal.kind, "Signal was not delivered; it will be retried on the next run");
        }
        Ok(RunOutcome::Signalled { signal, report })
    }
}
