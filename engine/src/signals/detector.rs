// EMA crossover detector gated by RSI.
use shared::models::SignalKind;

pub const DEFAULT_RSI_BUY_BELOW: f64 = 40.0;
pub const DEFAULT_RSI_SELL_ABOVE: f64 = 60.0;

/// Stateless classifier over the last two points of a fast/slow EMA pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDetector {
    pub rsi_buy_below: f64,
    pub rsi_sell_above: f64,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            rsi_buy_below: DEFAULT_RSI_BUY_BELOW,
            rsi_sell_above: DEFAULT_RSI_SELL_ABOVE,
        }
    }
}

impl SignalDetector {
    pub fn new(rsi_buy_below: f64, rsi_sell_above: f64) -> Self {
        Self {
            rsi_buy_below,
            rsi_sell_above,
        }
    }

    /// Classifies the cross between `index - 1` and `index`.
    ///
    /// Returns `None` during warm-up (any input undefined, `index == 0`, or
    /// `index` past the end of a series) and when no gated cross happened.
    pub fn detect(
        &self,
        ema_fast: &[Option<f64>],
        ema_slow: &[Option<f64>],
        rsi: &[Option<f64>],
        index: usize,
    ) -> Option<SignalKind> {
        let prev = index.checked_sub(1)?;
        let prev_fast = (*ema_fast.get(prev)?)?;
        let prev_slow = (*ema_slow.get(prev)?)?;
        let fast = (*ema_fast.get(index)?)?;
        let slow = (*ema_slow.get(index)?)?;
        let rsi_now = (*rsi.get(index)?)?;

        if crossed_up(prev_fast, prev_slow, fast, slow) && rsi_now < self.rsi_buy_below {
            Some(SignalKind::Buy)
        } else if crossed_down(prev_fast, prev_slow, fast, slow) && rsi_now > self.rsi_sell_above {
            Some(SignalKind::Sell)
        } else {
            None
        }
    }
}

/// Detection with the default 40/60 RSI gates.
pub fn detect(
    ema_fast: &[Option<f64>],
    ema_slow: &[Option<f64>],
    rsi: &[Option<f64>],
    index: usize,
) -> Option<SignalKind> {
    SignalDetector::default().detect(ema_fast, ema_slow, rsi, index)
}

// Touching counts as "not yet crossed"; the current bar must be strictly past.
fn crossed_up(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> bool {
    prev_fast <= prev_slow && fast > slow
}

fn crossed_down(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> bool {
    prev_fast >= prev_slow && fast < slow
}
