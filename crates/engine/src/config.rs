//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub characters_db: String,
    pub events_db: String,
    pub cache_ttl: Duration,
    /// How long a request waits for a pooled connection before failing
    pub acquire_timeout: Duration,
    /// Create missing databases and fill empty ones with the sample cast
    pub seed_sample_data: bool,
    /// Seed used by layout endpoints when the caller gives none
    pub layout_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3003,
            characters_db: "data/characters.db".into(),
            events_db: "data/events.db".into(),
            cache_ttl: Duration::from_secs(300),
            acquire_timeout: Duration::from_secs(5),
            seed_sample_data: false,
            layout_seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset and blank variables fall back to defaults; malformed ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let server_port = match get("SERVER_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SERVER_PORT must be a port number, got '{raw}'"))?,
            None => defaults.server_port,
        };
        let cache_ttl = match get("CATALOG_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("CATALOG_CACHE_TTL_SECS must be seconds, got '{raw}'"))?,
            ),
            None => defaults.cache_ttl,
        };
        let acquire_timeout = match get("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS must be seconds, got '{raw}'"))?
                    .max(1),
            ),
            None => defaults.acquire_timeout,
        };
        let seed_sample_data = match get("SEED_SAMPLE_DATA") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("SEED_SAMPLE_DATA must be a boolean, got '{raw}'"))?,
            None => defaults.seed_sample_data,
        };
        let layout_seed = match get("LAYOUT_SEED") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("LAYOUT_SEED must be an unsigned integer, got '{raw}'"))?,
            None => defaults.layout_seed,
        };

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            characters_db: get("CHARACTERS_DB").unwrap_or(defaults.characters_db),
            events_db: get("EVENTS_DB").unwrap_or(defaults.events_db),
            cache_ttl,
            acquire_timeout,
            seed_sample_data,
            layout_seed,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.server_host, self.server_port))
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("unrecognized flag"),
    }
}
