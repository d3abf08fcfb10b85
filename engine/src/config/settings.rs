// Engine settings, loaded from an optional JSON file and then environment overrides.
use crate::data::BinanceSettings;
use crate::error::{EngineError, EngineResult};
use crate::notify::TelegramSettings;
use crate::signals::{DedupSettings, StrategySettings};
use crate::storage::StorageSettings;
use serde::Deserialize;
use shared::models::TimeFrame;
use std::path::{Path, PathBuf};

/// Environment variable naming the JSON settings file.
pub const CONFIG_PATH_ENV: &str = "SCALPER_CONFIG";

// Binance caps a single klines request at 1000 rows.
const MAX_CANDLE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub candle_limit: usize,
    pub poll_interval_secs: u64,
    pub strategy: StrategySettings,
    pub binance: BinanceSettings,
    pub telegram: Option<TelegramSettings>,
    pub storage: Option<StorageSettings>,
    pub dedup: DedupSettings,
    /// Replay candles from this CSV instead of calling the exchange.
    pub csv_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            symbol: "BTCUSDT".to_string(),
            timeframe: TimeFrame::Minute15,
            candle_limit: 100,
            poll_interval_secs: 5 * 60,
            strategy: StrategySettings::default(),
            binance: BinanceSettings::default(),
            telegram: None,
            storage: None,
            dedup: DedupSettings::default(),
            csv_path: None,
        }
    }
}

impl EngineSettings {
    /// Reads `path` (if any), applies process environment overrides and validates.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
            .map_err(|e| EngineError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(raw: &str) -> EngineResult<Self> {
        serde_json::from_str(raw).map_err(|e| EngineError::ConfigError(e.to_string()))
    }

    /// Applies `SCALPER_*`, `BOT_TOKEN` and `CHAT_ID` values supplied by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> EngineResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("SCALPER_SYMBOL") {
            self.symbol = symbol;
        }
        if let Some(raw) = lookup("SCALPER_INTERVAL_SECS") {
            self.poll_interval_secs = raw.trim().parse().map_err(|_| {
                EngineError::ConfigError(format!("SCALPER_INTERVAL_SECS is not a number: '{}'", raw))
            })?;
        }
        if let Some(path) = lookup("SCALPER_DB_PATH") {
            self.storage = Some(StorageSettings { path: PathBuf::from(path) });
        }
        if let Some(path) = lookup("SCALPER_CSV_PATH") {
            self.csv_path = Some(PathBuf::from(path));
        }

        let token = lookup("BOT_TOKEN");
        let chat_id = lookup("CHAT_ID");
        if let Some(telegram) = self.telegram.as_mut() {
            if let Some(token) = token {
                telegram.bot_token = token;
            }
            if let Some(chat_id) = chat_id {
                telegram.chat_id = chat_id;
            }
        } else if let (Some(bot_token), Some(chat_id)) = (token, chat_id) {
            self.telegram = Some(TelegramSettings {
                bot_token,
                chat_id,
                api_base: crate::notify::telegram::TELEGRAM_API_BASE.to_string(),
                request_timeout_secs: 10,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        let strategy = &self.strategy;
        let fail = |msg: String| Err(EngineError::ConfigError(msg));

        if self.symbol.trim().is_empty() {
            return fail("symbol must not be empty".to_string());
        }
        if self.poll_interval_secs == 0 {
            return fail("poll_interval_secs must be greater than 0".to_string());
        }
        if strategy.fast_period == 0 || strategy.slow_period == 0 || strategy.rsi_period == 0 {
            return fail("indicator periods must be greater than 0".to_string());
        }
        if strategy.fast_period >= strategy.slow_period {
            return fail(format!(
                "fast_period ({}) must be shorter than slow_period ({})",
                strategy.fast_period, strategy.slow_period
            ));
        }
        for (name, value) in [
            ("rsi_buy_below", strategy.rsi_buy_below),
            ("rsi_sell_above", strategy.rsi_sell_above),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return fail(format!("{} must be within 0..=100, got {}", name, value));
            }
        }
        let levels = &strategy.levels;
        for (name, value) in [
            ("take_profit_pct", levels.take_profit_pct),
            ("stop_loss_pct", levels.stop_loss_pct),
            ("trailing_stop_pct", levels.trailing_stop_pct),
        ] {
            if !(0.0..1.0).contains(&value) {
                return fail(format!("{} must be within 0..1, got {}", name, value));
            }
        }
        if self.candle_limit == 0 || self.candle_limit > MAX_CANDLE_LIMIT {
            return fail(format!(
                "candle_limit must be within 1..={}, got {}",
                MAX_CANDLE_LIMIT, self.candle_limit
            ));
        }
        if self.candle_limit < strategy.warm_up() {
            return fail(format!(
                "candle_limit ({}) cannot cover the {} candle warm-up",
                self.candle_limit,
                strategy.warm_up()
            ));
        }
        Ok(())
    }
}
