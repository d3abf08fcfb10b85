// Technical indicators module
pub mod ema;
pub mod rsi;

pub use ema::{compute_ema, Ema};
pub use rsi::{compute_rsi, compute_rsi_with_policy, Rsi, ZeroLossPolicy, DEFAULT_RSI_PERIOD};

use serde_json::Value;
use shared::models::{Candle, IndicatorSeries};

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, data: &[Candle]) -> IndicatorSeries; // Same length as `data`, None during warm-up
}
