use std::env;
use std::time::Duration;

use anyhow::Context;

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub binance_api_key: String,
    pub binance_secret_key: String,
    pub binance_base_url: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: i64,
    pub signal_channel: String,
    pub poll_interval: Duration,
    pub monitor_timeout: Option<Duration>,
    pub max_concurrent_signals: usize,
}

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 90;
const DEFAULT_MAX_CONCURRENT_SIGNALS: usize = 8;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let telegram_chat_id = env::var("TELEGRAM_CHAT_ID")
            .context("TELEGRAM_CHAT_ID not set")?
            .parse::<i64>()
            .context("TELEGRAM_CHAT_ID must be a number")?;

        let poll_interval_secs = match env::var("POLL_INTERVAL_SECS") {
            Ok(raw) => raw.parse::<u64>().context("POLL_INTERVAL_SECS must be a number")?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let monitor_timeout = match env::var("MONITOR_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(
                raw.parse::<u64>().context("MONITOR_TIMEOUT_SECS must be a number")?,
            )),
            Err(_) => None,
        };

        let max_concurrent_signals = match env::var("MAX_CONCURRENT_SIGNALS") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("MAX_CONCURRENT_SIGNALS must be a number")?,
            Err(_) => DEFAULT_MAX_CONCURRENT_SIGNALS,
        };

        Ok(Self {
            binance_api_key: env::var("BINANCE_API_KEY").context("BINANCE_API_KEY not set")?,
            binance_secret_key: env::var("BINANCE_SECRET_KEY")
                .context("BINANCE_SECRET_KEY not set")?,
            binance_base_url: env::var("BINANCE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .context("TELEGRAM_BOT_TOKEN not set")?,
            telegram_chat_id,
            signal_channel: env::var("SIGNAL_CHANNEL").context("SIGNAL_CHANNEL not set")?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            monitor_timeout,
            max_concurrent_signals,
        })
    }
}
