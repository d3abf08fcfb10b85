// Signal pipeline: candles -> EMA(fast), EMA(slow), RSI -> optional Signal.
pub mod dedup;
pub mod detector;
pub mod levels;

pub use dedup::{DedupSettings, DuplicateGuard};
pub use detector::{detect, SignalDetector};
pub use levels::{compute_levels, LevelSettings};

use crate::indicators::{Ema, IndicatorCalculator, Rsi, ZeroLossPolicy};
use serde::Deserialize;
use shared::models::{Candle, Signal};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub fast_period: usize,
    pub slow_period: usize,
    pub rsi_period: usize,
    pub rsi_buy_below: f64,
    pub rsi_sell_above: f64,
    pub zero_loss: ZeroLossPolicy,
    pub levels: LevelSettings,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            fast_period: 20,
            slow_period: 50,
            rsi_period: crate::indicators::DEFAULT_RSI_PERIOD,
            rsi_buy_below: detector::DEFAULT_RSI_BUY_BELOW,
            rsi_sell_above: detector::DEFAULT_RSI_SELL_ABOVE,
            zero_loss: ZeroLossPolicy::default(),
            levels: LevelSettings::default(),
        }
    }
}

impl StrategySettings {
    pub fn detector(&self) -> SignalDetector {
        SignalDetector::new(self.rsi_buy_below, self.rsi_sell_above)
    }

    /// Candles needed before the detector can see two defined points of every series.
    pub fn warm_up(&self) -> usize {
        self.slow_period.max(self.fast_period).max(self.rsi_period) + 1
    }
}

/// Latest indicator readings alongside the detection result, for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub signal: Option<Signal>,
}

/// Runs the indicators over `candles` and classifies the most recent candle.
pub fn analyze(candles: &[Candle], settings: &StrategySettings) -> Analysis {
    let ema_fast = Ema::new(settings.fast_period).calculate(candles);
    let ema_slow = Ema::new(settings.slow_period).calculate(candles);
    let rsi = Rsi::with_policy(settings.rsi_period, settings.zero_loss).calculate(candles);

    let Some(index) = candles.len().checked_sub(1) else {
        return Analysis {
            ema_fast: None,
            ema_slow: None,
            rsi: None,
            signal: None,
        };
    };

    let signal = settings
        .detector()
        .detect(&ema_fast, &ema_slow, &rsi, index)
        .map(|kind| {
            let candle = &candles[index];
            let levels = compute_levels(kind, candle.close, &settings.levels);
            Signal::new(kind, candle.close, levels, candle.timestamp)
        });

    Analysis {
        ema_fast: ema_fast[index],
        ema_slow: ema_slow[index],
        rsi: rsi[index],
        signal,
    }
}

pub fn evaluate(candles: &[Candle], settings: &StrategySettings) -> Option<Signal> {
    analyze(candles, settings).signal
}


#[cfg(test)]
mod tests {
    use super::test_support::{downward_cross, upward_cross};
    use super::*;
    use crate::indicators::test_support::candles_from_closes;
    use shared::models::SignalKind;
    use shared::utils::format_fixed;

    #[test]
    fn test_evaluate_buy_signal() {
        let candles = upward_cross(8.0);
        let analysis = analyze(&candles, &StrategySettings::default());
        let signal = analysis.signal.expect("expected a BUY signal");

        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.price, 106.0);
        assert_eq!(signal.timestamp, candles.last().unwrap().timestamp);
        assert_eq!(format_fixed(signal.take_profit, 2), format_fixed(106.0 * 1.01, 2));
        assert_eq!(format_fixed(signal.stop_loss, 2), format_fixed(106.0 * 0.99, 2));
        assert_eq!(
            signal.description(),
            "buy @106 TP @107.06 SL @104.94 trailing stop @0.32"
        );
        assert!(analysis.rsi.unwrap() < 40.0);
        assert!(analysis.ema_fast.unwrap() > analysis.ema_slow.unwrap());
    }

    #[test]
    fn test_evaluate_sell_signal() {
        let candles = downward_cross(8.0);
        let signal = evaluate(&candles, &StrategySettings::default()).expect("expected a SELL signal");

        assert_eq!(signal.kind, SignalKind::Sell);
        assert_eq!(signal.price, 94.0);
        assert_eq!(format_fixed(signal.take_profit, 2), "93.06");
        assert_eq!(format_fixed(signal.stop_loss, 2), "94.94");
        assert_eq!(format_fixed(signal.trailing_stop, 2), "0.28");
    }

    #[test]
    fn test_evaluate_cross_with_rsi_above_buy_gate() {
        // A bigger jump still crosses but lifts RSI to ~43.5.
        let candles = upward_cross(10.0);
        let analysis = analyze(&candles, &StrategySettings::default());
        assert!(analysis.ema_fast.unwrap() > analysis.ema_slow.unwrap());
        assert!(analysis.rsi.unwrap() > 40.0);
        assert_eq!(analysis.signal, None);
    }

    #[test]
    fn test_evaluate_only_looks_at_last_candle() {
        let mut candles = upward_cross(8.0);
        let last = *candles.last().unwrap();
        let mut next = last;
        next.timestamp = last.timestamp + chrono::Duration::minutes(15);
        candles.push(next);
        assert_eq!(evaluate(&candles, &StrategySettings::default()), None);
    }

    #[test]
    fn test_warm_up_never_signals() {
        let candles = upward_cross(8.0);
        let settings = StrategySettings::default();
        for len in 0..settings.slow_period {
            assert_eq!(evaluate(&candles[..len], &settings), None, "len {}", len);
        }
    }

    #[test]
    fn test_analyze_empty_input() {
        let analysis = analyze(&[], &StrategySettings::default());
        assert_eq!(analysis.signal, None);
        assert_eq!(analysis.rsi, None);
    }

    #[test]
    fn test_flat_market_is_quiet() {
        let candles = candles_from_closes(&[100.0; 100]);
        let analysis = analyze(&candles, &StrategySettings::default());
        assert_eq!(analysis.signal, None);
        assert_eq!(analysis.ema_fast, Some(100.0));
    }

    #[test]
    fn test_warm_up_length() {
        assert_eq!(StrategySettings::default().warm_up(), 51);
    }
}
