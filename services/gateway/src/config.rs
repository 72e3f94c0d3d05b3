//! Gateway configuration from `SCOREBOARD_*` environment variables
//!
//! Every setting has a default. A value that fails to parse is logged and
//! replaced by the default rather than aborting startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use feed::{DEFAULT_FEED_CAPACITY, registry::DEFAULT_MAX_ROOMS_PER_CLIENT};
use tracing::warn;

pub const ENV_BIND_ADDR: &str = "SCOREBOARD_BIND_ADDR";
pub const ENV_JOURNAL_PATH: &str = "SCOREBOARD_JOURNAL_PATH";
pub const ENV_RECENT_CACHE: &str = "SCOREBOARD_RECENT_CACHE";
pub const ENV_FEED_CAPACITY: &str = "SCOREBOARD_FEED_CAPACITY";
pub const ENV_MAX_ROOMS_PER_CLIENT: &str = "SCOREBOARD_MAX_ROOMS_PER_CLIENT";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3001);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// `None` keeps matches in memory only
    pub journal_path: Option<PathBuf>,
    pub recent_cache: bool,
    pub feed_capacity: usize,
    pub max_rooms_per_client: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            journal_path: None,
            recent_cache: true,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            max_rooms_per_client: DEFAULT_MAX_ROOMS_PER_CLIENT,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let journal_path = lookup(ENV_JOURNAL_PATH)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let recent_cache = match lookup(ENV_RECENT_CACHE) {
            None => defaults.recent_cache,
            Some(raw) => parse_switch(&raw).unwrap_or_else(|| {
                warn!(key = ENV_RECENT_CACHE, value = %raw, "Expected on/off, using default");
                defaults.recent_cache
            }),
        };

        Self {
            bind_addr: parsed(&lookup, ENV_BIND_ADDR, defaults.bind_addr),
            journal_path,
            recent_cache,
            feed_capacity: parsed(&lookup, ENV_FEED_CAPACITY, defaults.feed_capacity),
            max_rooms_per_client: parsed(
                &lookup,
                ENV_MAX_ROOMS_PER_CLIENT,
                defaults.max_rooms_per_client,
            ),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key, value = %raw, %default, "Unparseable setting, using default");
        default
    })
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
