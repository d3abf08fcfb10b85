// Take-profit / stop-loss / trailing-stop levels derived from the signal price.
use serde::Deserialize;
use shared::models::{SignalKind, TradeLevels};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub trailing_stop_pct: f64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            take_profit_pct: 0.01,
            stop_loss_pct: 0.01,
            trailing_stop_pct: 0.003,
        }
    }
}

/// Take-profit sits on the profitable side of `price`, stop-loss on the other.
/// Nothing is rounded here.
pub fn compute_levels(kind: SignalKind, price: f64, settings: &LevelSettings) -> TradeLevels {
    let (take_profit, stop_loss) = match kind {
        SignalKind::Buy => (
            price * (1.0 + settings.take_profit_pct),
            price * (1.0 - settings.stop_loss_pct),
        ),
        SignalKind::Sell => (
            price * (1.0 - settings.take_profit_pct),
            price * (1.0 + settings.stop_loss_pct),
        ),
    };
    TradeLevels {
        take_profit,
        stop_loss,
        trailing_stop: price * settings.trailing_stop_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::utils::format_fixed;

    #[test]
    fn test_buy_levels() {
        let levels = compute_levels(SignalKind::Buy, 200.0, &LevelSettings::default());
        assert!((levels.take_profit - 202.0).abs() < 1e-9);
        assert!((levels.stop_loss - 198.0).abs() < 1e-9);
        assert!((levels.trailing_stop - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_sell_levels_are_mirrored() {
        let levels = compute_levels(SignalKind::Sell, 200.0, &LevelSettings::default());
        assert!((levels.take_profit - 198.0).abs() < 1e-9);
        assert!((levels.stop_loss - 202.0).abs() < 1e-9);
        assert!((levels.trailing_stop - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_levels_keep_full_precision() {
        let price = 64123.456;
        let levels = compute_levels(SignalKind::Buy, price, &LevelSettings::default());
        assert!((levels.take_profit - price * 1.01).abs() < 1e-6);
        assert_eq!(format_fixed(levels.take_profit, 2), "64764.69");
        assert_eq!(format_fixed(levels.stop_loss, 2), "63482.22");
        assert_eq!(format_fixed(levels.trailing_stop, 2), "192.37");
    }
}
