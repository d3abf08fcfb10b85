//! Binance spot kline client.

use super::market_data::MarketDataProvider;
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shared::models::{Candle, TimeFrame};
use std::time::Duration;

/// Binance public REST base URL
pub const BINANCE_API_BASE: &str = "https://api.binance.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BinanceSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_BASE.to_string(),
            request_timeout_secs: 10,
        }
    }
}

pub struct BinanceKlineProvider {
    client: Client,
    base_url: String,
    symbol: String,
    timeframe: TimeFrame,
    limit: usize,
}

impl BinanceKlineProvider {
    pub fn new(
        settings: &BinanceSettings,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            symbol: symbol.to_uppercase(),
            timeframe,
            limit,
        })
    }

    fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceKlineProvider {
    fn describe(&self) -> String {
        format!("binance {} {}", self.symbol, self.timeframe.as_interval())
    }

    async fn fetch_candles(&self) -> EngineResult<Vec<Candle>> {
        let response = self
            .client
            .get(self.klines_url())
            .query(&[
                ("symbol", self.symbol.clone()),
                ("interval", self.timeframe.as_interval().to_string()),
                ("limit", self.limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::MarketDataError(format!(
                "klines request for {} failed with {}: {}",
                self.symbol, status, body
            )));
        }

        let rows: Vec<Vec<Value>> = response.json().await?;
        let candles = parse_klines(&rows)?;
        tracing::debug!(symbol = %self.symbol, count = candles.len(), "Fetched klines");
        Ok(candles)
    }
}

/// Converts raw kline rows (`[open_time_ms, "open", "high", "low", "close", ...]`).
/// Any malformed row fails the whole batch.
pub fn parse_klines(rows: &[Vec<Value>]) -> EngineResult<Vec<Candle>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            if row.len() < 5 {
                return Err(EngineError::MarketDataError(format!(
                    "kline row {} has {} fields, expected at least 5",
                    idx,
                    row.len()
                )));
            }
            let open_time_ms = row[0].as_i64().ok_or_else(|| {
                EngineError::MarketDataError(format!("kline row {} has a non-integer open time", idx))
            })?;
            let timestamp = DateTime::from_timestamp(open_time_ms.div_euclid(1000), 0).ok_or_else(|| {
                EngineError::MarketDataError(format!("kline row {} open time {} out of range", idx, open_time_ms))
            })?;

            Ok(Candle {
                timestamp,
                open: price_field(row, 1, "open", idx)?,
                high: price_field(row, 2, "high", idx)?,
                low: price_field(row, 3, "low", idx)?,
                close: price_field(row, 4, "close", idx)?,
            })
        })
        .collect()
}

// Binance sends prices as decimal strings; plain numbers are accepted too.
fn price_field(row: &[Value], pos: usize, name: &str, idx: usize) -> EngineResult<f64> {
    let parsed = match &row[pos] {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| {
        EngineError::MarketDataError(format!(
            "kline row {} has an invalid '{}' value: {}",
            idx, name, row[pos]
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn rows(value: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_klines() {
        let payload = rows(json!([
            [1714564800000i64, "64000.10", "64100.00", "63950.50", "64050.25", "12.5", 1714565699999i64, "0", 10, "0", "0", "0"],
            [1714565700000i64, "64050.25", "64200.00", "64000.00", "64180.00", "8.1", 1714566599999i64, "0", 7, "0", "0", "0"]
        ]));
        let candles = parse_klines(&payload).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(candles[0].open, 64000.10);
        assert_eq!(candles[0].close, 64050.25);
        assert_eq!(candles[1].high, 64200.0);
    }

    #[test]
    fn test_parse_klines_numeric_prices() {
        let payload = rows(json!([[1714564800000i64, 1.5, 2.0, 1.0, 1.75]]));
        let candles = parse_klines(&payload).unwrap();
        assert_eq!(candles[0].close, 1.75);
    }

    #[test]
    fn test_parse_klines_rejects_bad_price() {
        let payload = rows(json!([[1714564800000i64, "64000.10", "oops", "63950.50", "64050.25"]]));
        let err = parse_klines(&payload).unwrap_err();
        assert!(err.to_string().contains("invalid 'high' value"));
    }

    #[test]
    fn test_parse_klines_rejects_short_row() {
        let payload = rows(json!([[1714564800000i64, "1", "2"]]));
        let err = parse_klines(&payload).unwrap_err();
        assert!(err.to_string().contains("has 3 fields"));
    }

    #[test]
    fn test_parse_klines_rejects_bad_time() {
        let payload = rows(json!([["yesterday", "1", "2", "0.5", "1.5"]]));
        assert!(parse_klines(&payload).is_err());
    }

    #[test]
    fn test_provider_url_and_description() {
        let settings = BinanceSettings {
            base_url: "http://localhost:9999/".to_string(),
            request_timeout_secs: 1,
        };
        let provider = BinanceKlineProvider::new(&settings, "btcusdt", TimeFrame::Minute15, 100).unwrap();
        assert_eq!(provider.klines_url(), "http://localhost:9999/api/v3/klines");
        assert_eq!(provider.describe(), "binance BTCUSDT 15m");
    }
}
