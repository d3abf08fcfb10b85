use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::{format_fixed, format_timestamp};

/// One OHLC bar. Timestamps are the bar's open time, second precision, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Indicator output aligned index-for-index with the candle slice it was computed from.
/// `None` marks positions without enough history.
pub type IndicatorSeries = Vec<Option<f64>>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour4,
    Day1,
}

impl TimeFrame {
    /// Interval string understood by the exchange kline endpoint.
    pub fn as_interval(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
        }
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        TimeFrame::Minute15
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(SignalKind::Buy),
            "SELL" => Some(SignalKind::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute price levels attached to a signal. Kept at full precision;
/// rounding only happens when the signal is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Offset from price, not a price bound.
    pub trailing_stop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub trailing_stop: f64,
    /// Open time of the candle the signal was detected on.
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn new(kind: SignalKind, price: f64, levels: TradeLevels, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            price,
            take_profit: levels.take_profit,
            stop_loss: levels.stop_loss,
            trailing_stop: levels.trailing_stop,
            timestamp,
        }
    }

    /// Single-line rendering used for logs, notifications and storage,
    /// e.g. `buy @100 TP @101.00 SL @99.00 trailing stop @0.30`.
    pub fn description(&self) -> String {
        format!(
            "{} @{} TP @{} SL @{} trailing stop @{}",
            self.kind.as_str().to_lowercase(),
            self.price,
            format_fixed(self.take_profit, 2),
            format_fixed(self.stop_loss, 2),
            format_fixed(self.trailing_stop, 2),
        )
    }

    pub fn to_record(&self) -> SignalRecord {
        SignalRecord {
            timestamp: self.timestamp,
            kind: self.kind,
            outcome: SignalRecord::PENDING_OUTCOME.to_string(),
            description: self.description(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_timestamp(&self.timestamp), self.description())
    }
}

/// Flat row handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    /// Filled in later by whoever reviews the trade; `"-"` until then.
    pub outcome: String,
    pub description: String,
}

impl SignalRecord {
    pub const PENDING_OUTCOME: &'static str = "-";
}
