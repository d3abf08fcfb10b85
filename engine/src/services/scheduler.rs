// Fixed-cadence driver for the signal pipeline.
use super::signal_service::{RunOutcome, SignalService};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Runs once immediately, then every `period` until `shutdown` resolves.
    ///
    /// Each run is awaited before the next tick is taken, and ticks missed while
    /// a run was in progress are dropped, so runs never overlap or queue up.
    /// A failed run is logged and the loop keeps going. Returns the number of runs started.
    pub async fn run_until<F>(&self, service: &SignalService, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut runs = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(runs, "Scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    runs += 1;
                    match service.run_once().await {
                        Ok(RunOutcome::Signalled { report, .. }) => {
                            tracing::debug!(?report, "Signal reported");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "Pipeline run failed; waiting for next tick"),
                    }
                }
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signal_service::test_support::FakeProvider;
    use crate::indicators::test_support::candles_from_closes;
    use crate::signals::{DedupSettings, StrategySettings};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_on_interval() {
        let provider = Arc::new(FakeProvider::ok(candles_from_closes(&[100.0; 60])));
        let service = SignalService::new(provider.clone(), StrategySettings::default(), &DedupSettings::default());
        let scheduler = Scheduler::new(Duration::from_secs(300));

        let runs = scheduler
            .run_until(&service, tokio::time::sleep(Duration::from_secs(650)))
            .await;

        // t = 0, 300, 600
        assert_eq!(runs, 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_runs_do_not_stop_the_loop() {
        let provider = Arc::new(FakeProvider::failing("timeout"));
        let service = SignalService::new(provider.clone(), StrategySettings::default(), &DedupSettings::default());
        let scheduler = Scheduler::new(Duration::from_secs(60));

        let runs = scheduler
            .run_until(&service, tokio::time::sleep(Duration::from_secs(150)))
            .await;

        assert_eq!(runs, 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_shutdown_after_first_run() {
        let provider = Arc::new(FakeProvider::ok(candles_from_closes(&[100.0; 60])));
        let service = SignalService::new(provider.clone(), StrategySettings::default(), &DedupSettings::default());
        let scheduler = Scheduler::new(Duration::from_secs(300));

        let runs = scheduler
            .run_until(&service, tokio::time::sleep(Duration::from_secs(1)))
            .await;
        assert_eq!(runs, 1);
    }
}
