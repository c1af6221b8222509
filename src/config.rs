//! Feed configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "vida_id": 5544,
//!   "start_block": "latest",
//!   "orphan_likes": { "buffer": { "max_pending": 256 } },
//!   "poll_interval_ms": 50
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::OrphanLikePolicy;

pub const DEFAULT_VIDA_ID: u64 = 5544;
pub const DEFAULT_RPC_URL: &str = "https://pwrrpc.pwrlabs.io/";

const ENV_VIDA_ID: &str = "VIDA_FEED_VIDA_ID";
const ENV_START_BLOCK: &str = "VIDA_FEED_START_BLOCK";
const ENV_POLL_INTERVAL_MS: &str = "VIDA_FEED_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read config {}: {}", path, message)
            }
            ConfigError::Parse(msg) => write!(f, "failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where a fresh subscription starts reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StartBlockRepr", into = "StartBlockRepr")]
pub enum StartBlock {
    /// The chain's latest block at subscribe time; earlier history is not replayed.
    #[default]
    Latest,
    At(u64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StartBlockRepr {
    Block(u64),
    Keyword(String),
}

impl TryFrom<StartBlockRepr> for StartBlock {
    type Error = String;

    fn try_from(repr: StartBlockRepr) -> Result<Self, Self::Error> {
        match repr {
            StartBlockRepr::Block(n) => Ok(StartBlock::At(n)),
            StartBlockRepr::Keyword(word) => word.parse(),
        }
    }
}

impl From<StartBlock> for StartBlockRepr {
    fn from(start: StartBlock) -> Self {
        match start {
            StartBlock::Latest => StartBlockRepr::Keyword("latest".into()),
            StartBlock::At(n) => StartBlockRepr::Block(n),
        }
    }
}

impl std::str::FromStr for StartBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(StartBlock::Latest);
        }
        s.parse::<u64>()
            .map(StartBlock::At)
            .map_err(|_| format!("expected \"latest\" or a block number, got {:?}", s))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Application id the feed's transactions are tagged with.
    pub vida_id: u64,
    /// RPC endpoint for network-backed transports. Unused by the in-memory chain.
    pub rpc_url: String,
    pub start_block: StartBlock,
    pub orphan_likes: OrphanLikePolicy,
    pub poll_interval_ms: u64,
    /// Whether submissions wait for finality before returning.
    pub await_finality: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            vida_id: DEFAULT_VIDA_ID,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            start_block: StartBlock::Latest,
            orphan_likes: OrphanLikePolicy::Drop,
            poll_interval_ms: 50,
            await_finality: true,
        }
    }
}

impl FeedConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Load `path` if it exists, otherwise start from defaults; then apply
    /// environment overrides. Never fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut config = if path.exists() {
            match Self::load(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("config load failed, using defaults: {e}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Invalid values are
    /// ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = non_empty(lookup(ENV_VIDA_ID)) {
            match raw.parse::<u64>() {
                Ok(value) => self.vida_id = value,
                Err(err) => tracing::warn!("invalid {ENV_VIDA_ID}, ignoring: {err}"),
            }
        }

        if let Some(raw) = non_empty(lookup(ENV_START_BLOCK)) {
            match raw.parse::<StartBlock>() {
                Ok(value) => self.start_block = value,
                Err(err) => tracing::warn!("invalid {ENV_START_BLOCK}, ignoring: {err}"),
            }
        }

        if let Some(raw) = non_empty(lookup(ENV_POLL_INTERVAL_MS)) {
            match raw.parse::<u64>() {
                Ok(value) => self.poll_interval_ms = value,
                Err(err) => tracing::warn!("invalid {ENV_POLL_INTERVAL_MS}, ignoring: {err}"),
            }
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
