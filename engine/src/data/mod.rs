// Candle sources feeding the signal pipeline.
pub mod binance;
pub mod csv_parser;
pub mod market_data;

pub use binance::{BinanceKlineProvider, BinanceSettings};
pub use csv_parser::CsvCandleProvider;
pub use market_data::{validate_candles, MarketDataProvider};
