use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("HTTP error: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    // Candles that reached the engine but break its ordering/finiteness assumptions.
    #[error("Invalid candle data: {0}")]
    InvalidCandles(String),

    #[error("Signal storage error: {source}")]
    StorageError {
        #[from]
        source: rusqlite::Error,
    },

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
