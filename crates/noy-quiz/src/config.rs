//! Quiz service configuration.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::DEFAULT_IDLE_TIMEOUT;

/// How repeated answers to the same question are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VoteMode {
    /// Only the latest answer per question counts.
    #[default]
    Latest,
    /// Every submitted answer is a vote, and advancing a layer casts the
    /// current answers once more.
    Additive,
}

impl VoteMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Additive => "additive",
        }
    }
}

impl fmt::Display for VoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "additive" => Ok(Self::Additive),
            other => Err(Error::Config(format!("unknown vote mode: {other}"))),
        }
    }
}

/// Configuration for the quiz service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Maximum number of live sessions
    pub max_sessions: usize,

    /// Vote counting mode for new sessions
    pub vote_mode: VoteMode,

    /// Sessions untouched this long are dropped
    pub session_ttl: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_sessions: 10_000,
            vote_mode: VoteMode::default(),
            session_ttl: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl QuizConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// - `NOY_API_ADDR` (default `0.0.0.0:8080`)
    /// - `NOY_MAX_SESSIONS` (default `10000`)
    /// - `NOY_VOTE_MODE`: `latest` or `additive` (default `latest`)
    /// - `NOY_SESSION_TTL_SECS` (default `3600`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("NOY_API_ADDR") {
            config.api_addr = addr
                .parse()
                .map_err(|e| Error::Config(format!("invalid NOY_API_ADDR {addr:?}: {e}")))?;
        }

        if let Some(max) = lookup("NOY_MAX_SESSIONS") {
            config.max_sessions = max
                .parse()
                .map_err(|e| Error::Config(format!("invalid NOY_MAX_SESSIONS {max:?}: {e}")))?;
        }
        if config.max_sessions == 0 {
            return Err(Error::Config("NOY_MAX_SESSIONS must be at least 1".into()));
        }

        if let Some(mode) = lookup("NOY_VOTE_MODE") {
            config.vote_mode = mode.parse()?;
        }

        if let Some(ttl) = lookup("NOY_SESSION_TTL_SECS") {
            let secs: u64 = ttl
                .parse()
                .map_err(|e| Error::Config(format!("invalid NOY_SESSION_TTL_SECS {ttl:?}: {e}")))?;
            if secs == 0 {
                return Err(Error::Config("NOY_SESSION_TTL_SECS must be at least 1".into()));
            }
            config.session_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
