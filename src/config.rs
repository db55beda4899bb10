//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use std::time::Duration;

/// Coin ids the dashboard tracks, mapped to their spot market symbols.
const COIN_MARKETS: &[(&str, &str)] = &[
    ("bitcoin", "btcusdt"),
    ("ethereum", "ethusdt"),
    ("cardano", "adausdt"),
];

pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443";
pub const DEFAULT_COINS: &str = "bitcoin,ethereum,cardano";
pub const DEFAULT_PRICE_CHANGE_THRESHOLD: f64 = 0.01;
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BASE_RECONNECT_DELAY_MS: u64 = 3000;
pub const DEFAULT_TOAST_AUTO_DISMISS_MS: u64 = 3000;

/// Consolidated settings for one price stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket base endpoint of the exchange combined-stream feed.
    pub ws_url: String,
    /// Market symbols subscribed for the connection's lifetime.
    pub symbols: Vec<String>,
    /// Relative change that qualifies as an alert (0.01 = 1%).
    pub price_change_threshold: f64,
    /// Reconnect attempts before giving up on the session.
    pub max_retries: u32,
    /// First reconnect delay; doubles on every consecutive failure.
    pub base_reconnect_delay: Duration,
    /// Visible lifetime of a transient alert toast.
    pub toast_auto_dismiss: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.into(),
            symbols: COIN_MARKETS.iter().map(|(_, m)| (*m).to_string()).collect(),
            price_change_threshold: DEFAULT_PRICE_CHANGE_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            base_reconnect_delay: Duration::from_millis(DEFAULT_BASE_RECONNECT_DELAY_MS),
            toast_auto_dismiss: Duration::from_millis(DEFAULT_TOAST_AUTO_DISMISS_MS),
        }
    }
}

impl StreamConfig {
    /// Load configuration from environment variables, falling back to the
    /// dashboard defaults.
    pub fn from_env() -> Result<Self> {
        let ws_url = std::env::var("STREAM_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.into());
        let coins = std::env::var("COINS").unwrap_or_else(|_| DEFAULT_COINS.into());
        let symbols = coins
            .split(',')
            .map(str::trim)
            .filter(|coin| !coin.is_empty())
            .map(market_symbol)
            .collect::<Result<Vec<_>>>()?;
        if symbols.is_empty() {
            return Err(AppError::Config("COINS must name at least one coin".into()));
        }

        Ok(Self {
            ws_url,
            symbols,
            price_change_threshold: env_f64(
                "PRICE_CHANGE_THRESHOLD",
                DEFAULT_PRICE_CHANGE_THRESHOLD,
            )?,
            max_retries: env_u32("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            base_reconnect_delay: Duration::from_millis(env_u64(
                "BASE_RECONNECT_DELAY_MS",
                DEFAULT_BASE_RECONNECT_DELAY_MS,
            )?),
            toast_auto_dismiss: Duration::from_millis(env_u64(
                "TOAST_AUTO_DISMISS_MS",
                DEFAULT_TOAST_AUTO_DISMISS_MS,
            )?),
        })
    }
}

/// Resolve a dashboard coin id to its spot market symbol.
pub fn market_symbol(coin: &str) -> Result<String> {
    COIN_MARKETS
        .iter()
        .find(|(id, _)| *id == coin)
        .map(|(_, market)| (*market).to_string())
        .ok_or_else(|| AppError::Config(format!("unknown coin id: {coin}")))
}

fn env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}

fn env_u32(key: &str, default: u32) -> Result<u32> {
    match std::env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}
