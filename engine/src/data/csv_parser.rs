// Offline candle source: replays a window from a CSV export.
use super::market_data::MarketDataProvider;
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::Candle;
use std::io::Read;
use std::path::PathBuf;

// Header: timestamp,open,high,low,close
// Example Row: 1714564800,64000.10,64100.00,63950.50,64050.25
// `timestamp` may also be RFC 3339 (2024-05-01T12:00:00Z). Extra columns are ignored.
pub struct CsvCandleProvider {
    path: PathBuf,
    limit: usize,
}

impl CsvCandleProvider {
    /// Serves the last `limit` rows of the file on every fetch.
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }
}

#[async_trait]
impl MarketDataProvider for CsvCandleProvider {
    fn describe(&self) -> String {
        format!("csv {}", self.path.display())
    }

    async fn fetch_candles(&self) -> EngineResult<Vec<Candle>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let mut candles = parse_candles(bytes.as_slice())?;
        if candles.len() > self.limit {
            candles.drain(..candles.len() - self.limit);
        }
        Ok(candles)
    }
}

pub fn parse_candles<R: Read>(reader: R) -> EngineResult<Vec<Candle>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut candles = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let timestamp = parse_timestamp(required_field(&record, &headers, "timestamp", line)?)
            .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing 'timestamp' at line {}: {}", line, e)))?;

        candles.push(Candle {
            timestamp,
            open: parse_price(&record, &headers, "open", line)?,
            high: parse_price(&record, &headers, "high", line)?,
            low: parse_price(&record, &headers, "low", line)?,
            close: parse_price(&record, &headers, "close", line)?,
        });
    }
    Ok(candles)
}

fn required_field<'a>(
    record: &'a StringRecord,
    headers: &StringRecord,
    name: &str,
    line: u64,
) -> EngineResult<&'a str> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .and_then(|pos| record.get(pos))
        .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field in CSV record at line {}", name, line)))
}

fn parse_price(record: &StringRecord, headers: &StringRecord, name: &str, line: u64) -> EngineResult<f64> {
    let raw = required_field(record, headers, name, line)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            EngineError::CsvDataFormatError(format!(
                "Error parsing '{}' at line {}: invalid number '{}'",
                name, line, raw
            ))
        })
}

// Unix seconds, or RFC 3339.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("'{}' out of range", raw));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("'{}': {}", raw, e))
}
