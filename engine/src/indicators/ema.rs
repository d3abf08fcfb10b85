// Exponential Moving Average (EMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{Candle, IndicatorSeries};
use std::iter;

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> IndicatorSeries {
        compute_ema(data, self.period)
    }
}

/// EMA of closes, seeded with the SMA of the first `period` closes at index `period - 1`.
///
/// Every later point is `(close - prev) * k + prev` with `k = 2 / (period + 1)`.
/// Returns all `None` when `period` is zero or the slice is shorter than `period`.
pub fn compute_ema(data: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || data.len() < period {
        return vec![None; data.len()];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = data[..period].iter().map(|c| c.close).sum::<f64>() / period as f64;

    let smoothed = data[period..].iter().scan(seed, |prev, candle| {
        *prev = (candle.close - *prev) * multiplier + *prev;
        Some(Some(*prev))
    });

    iter::repeat(None)
        .take(period - 1)
        .chain(iter::once(Some(seed)))
        .chain(smoothed)
        .collect()
}
