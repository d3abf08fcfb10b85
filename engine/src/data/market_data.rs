// Market data collaborator: anything that can hand the engine an ordered candle window.
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use shared::models::Candle;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short human-readable source name for logs, e.g. `binance BTCUSDT 15m`.
    fn describe(&self) -> String;

    /// Most recent candle window, oldest first. Failures surface as errors, never
    /// as placeholder candles.
    async fn fetch_candles(&self) -> EngineResult<Vec<Candle>>;
}

/// Rejects windows the indicator code can't trust: non-finite prices or
/// timestamps that don't strictly increase.
pub fn validate_candles(candles: &[Candle]) -> EngineResult<()> {
    for (idx, candle) in candles.iter().enumerate() {
        let prices = [candle.open, candle.high, candle.low, candle.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::InvalidCandles(format!(
                "non-finite price in candle {} at {}",
                idx, candle.timestamp
            )));
        }
    }

    if let Some(pair) = candles.windows(2).find(|pair| pair[1].timestamp <= pair[0].timestamp) {
        return Err(EngineError::InvalidCandles(format!(
            "timestamps not strictly increasing: {} followed by {}",
            pair[0].timestamp, pair[1].timestamp
        )));
    }
    Ok(())
}
