//! Controller configuration

use shakmaty::Color;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/api/chess/move";

/// Settings for a [`MoveController`](crate::MoveController) and its remote opponent.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Full URL of the move-suggestion endpoint.
    pub endpoint: String,
    /// Side the bot plays. The bot always moves second. Default: Black.
    pub bot_side: Color,
    /// Pause between the player's move and the bot request. Default: 250ms.
    pub reply_delay: Duration,
    /// Timeout for a single bot request. Default: 30s.
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bot_side: Color::Black,
            reply_delay: Duration::from_millis(250),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ControllerConfig {
    /// Reads overrides from `CHESS_BOT_ENDPOINT`, `CHESS_BOT_DELAY_MS` and
    /// `CHESS_BOT_TIMEOUT_SECS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("CHESS_BOT_ENDPOINT") {
            let endpoint = endpoint.trim();
            if endpoint.is_empty() {
                return Err(Error::Config("CHESS_BOT_ENDPOINT is empty".into()));
            }
            config.endpoint = endpoint.to_string();
        }
        if let Some(ms) = lookup("CHESS_BOT_DELAY_MS") {
            config.reply_delay = Duration::from_millis(parse_number("CHESS_BOT_DELAY_MS", &ms)?);
        }
        if let Some(secs) = lookup("CHESS_BOT_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("CHESS_BOT_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number, got '{}'", key, value)))
}
