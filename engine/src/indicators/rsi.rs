// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use serde::Deserialize;
use serde_json::Value;
use shared::models::{Candle, IndicatorSeries};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// How a window without any losing deltas is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroLossPolicy {
    /// Divide by 1 instead of 0. RSI tends toward 100 as gains grow but
    /// never reaches it; a flat window scores 0.
    #[default]
    UnitLoss,
    /// Score 100 when there were gains and 50 for a flat window.
    Saturate,
}

pub struct Rsi {
    name: String,
    period: usize,
    zero_loss: ZeroLossPolicy,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self::with_policy(period, ZeroLossPolicy::default())
    }

    pub fn with_policy(period: usize, zero_loss: ZeroLossPolicy) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
            zero_loss,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> IndicatorSeries {
        compute_rsi_with_policy(data, self.period, self.zero_loss)
    }
}

/// RSI over the trailing `period` close-to-close deltas, zero losses treated as 1.
pub fn compute_rsi(data: &[Candle], period: usize) -> IndicatorSeries {
    compute_rsi_with_policy(data, period, ZeroLossPolicy::UnitLoss)
}

/// Each defined point sums gains and losses over its own window; nothing is
/// carried between indices, so a value depends only on the last `period + 1` closes.
pub fn compute_rsi_with_policy(
    data: &[Candle],
    period: usize,
    zero_loss: ZeroLossPolicy,
) -> IndicatorSeries {
    if period == 0 {
        return vec![None; data.len()];
    }

    (0..data.len())
        .map(|i| {
            if i < period {
                return None;
            }
            let (gain, loss) = data[i - period..=i]
                .windows(2)
                .map(|pair| pair[1].close - pair[0].close)
                .fold((0.0, 0.0), |(gain, loss), change| {
                    if change > 0.0 {
                        (gain + change, loss)
                    } else {
                        (gain, loss - change) // losses are positive values
                    }
                });
            Some(score(gain, loss, zero_loss))
        })
        .collect()
}

fn score(gain: f64, loss: f64, zero_loss: ZeroLossPolicy) -> f64 {
    if loss == 0.0 {
        match zero_loss {
            ZeroLossPolicy::UnitLoss => 100.0 - 100.0 / (1.0 + gain),
            ZeroLossPolicy::Saturate if gain > 0.0 => 100.0,
            ZeroLossPolicy::Saturate => 50.0,
        }
    } else {
        let rs = gain / loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
