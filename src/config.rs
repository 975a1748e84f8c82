use std::env;
use std::time::Duration;

use crate::error::{BotError, Result};

/// Runtime configuration, read once at startup from the environment.
/// Read-only for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    /// Leverage applied per symbol before the entry order.
    pub leverage: u32,
    /// Fixed notional (quote currency) per trade.
    pub investment_per_trade: f64,
    /// Unrealized PnL (quote currency) at which a position is closed.
    pub profit_target: f64,
    /// Percent change beyond which the momentum detector fires.
    pub momentum_threshold_pct: f64,
    /// Candle interval for momentum detection, e.g. "1m".
    pub short_interval: String,
    /// Candle interval for the RSI detector, e.g. "15m".
    pub long_interval: String,
    /// Scan cadence.
    pub tick_interval: Duration,
    /// Position monitor polling cadence.
    pub poll_interval: Duration,
    /// Quote asset the symbol universe is restricted to.
    pub quote_asset: String,
    /// Symbol prefixes excluded from the universe.
    pub exclude_prefixes: Vec<String>,
    /// Candles fetched per series.
    pub candle_limit: usize,
    pub use_testnet: bool,
}

impl Config {
    /// Load from environment variables, with defaults matching the
    /// recognized option set. `BINANCE_API_KEY` / `BINANCE_API_SECRET`
    /// are required, everything else falls back to a default.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("BINANCE_API_KEY")
            .map_err(|_| BotError::Config("BINANCE_API_KEY not set".to_string()))?;
        let api_secret = env::var("BINANCE_API_SECRET")
            .map_err(|_| BotError::Config("BINANCE_API_SECRET not set".to_string()))?;

        let exclude_prefixes = env::var("EXCLUDE_PREFIXES")
            .unwrap_or_else(|_| "BTC".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            api_key,
            api_secret,
            leverage: parse_var("LEVERAGE", 14),
            investment_per_trade: parse_var("INVESTMENT", 3.0),
            profit_target: parse_var("PROFIT_TARGET", 0.1),
            momentum_threshold_pct: parse_var("MOMENTUM_THRESHOLD", 1.5),
            short_interval: env::var("SHORT_INTERVAL").unwrap_or_else(|_| "1m".to_string()),
            long_interval: env::var("LONG_INTERVAL").unwrap_or_else(|_| "15m".to_string()),
            tick_interval: Duration::from_secs(parse_var("TICK_INTERVAL_SECS", 60)),
            poll_interval: Duration::from_secs(parse_var("POLL_INTERVAL_SECS", 5)),
            quote_asset: env::var("QUOTE_ASSET").unwrap_or_else(|_| "USDT".to_string()),
            exclude_prefixes,
            candle_limit: parse_var("CANDLE_LIMIT", 50),
            use_testnet: parse_var("BINANCE_USE_TESTNET", false),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    "{} is set to {:?} but could not be parsed, using the default",
                    name,
                    raw
                );
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
impl Default for Config {
    /// Test fixture with stock defaults and dummy credentials.
    fn default() -> Self {
        Self {
            api_key: "test_key".to_string(),
            api_secret: "test_secret".to_string(),
            leverage: 14,
            investment_per_trade: 3.0,
            profit_target: 0.1,
            momentum_threshold_pct: 1.5,
            short_interval: "1m".to_string(),
            long_interval: "15m".to_string(),
            tick_interval: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            quote_asset: "USDT".to_string(),
            exclude_prefixes: vec!["BTC".to_string()],
            candle_limit: 50,
            use_testnet: false,
        }
    }
}
