//! Runtime settings, read from `SNAPFLOW_*` environment variables.
//!
//! Unset variables take their defaults; unparsable ones are reported with a
//! warning and also fall back to the default.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::services::latency::{FixedLatency, Latency, NoLatency};

pub const DEFAULT_NAMESPACE: &str = "snapflow";
const DEFAULT_STORY_TTL_HOURS: i64 = 24;
const DEFAULT_RECENT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prefix of every persisted key.
    pub namespace: String,
    pub latency: LatencyConfig,
    /// Lifetime of a new story.
    pub story_ttl_hours: i64,
    /// Capacity of the recent-search history.
    pub recent_search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            latency: LatencyConfig::Off,
            story_ttl_hours: DEFAULT_STORY_TTL_HOURS,
            recent_search_limit: DEFAULT_RECENT_SEARCH_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            namespace: lookup("SNAPFLOW_NAMESPACE")
                .filter(|ns| crate::storage::validate_key(ns).is_ok())
                .unwrap_or(default.namespace),
            latency: parse_or("SNAPFLOW_LATENCY_MS", &lookup, LatencyConfig::parse, default.latency),
            story_ttl_hours: parse_or(
                "SNAPFLOW_STORY_TTL_HOURS",
                &lookup,
                |s| positive(s.parse::<i64>()?),
                default.story_ttl_hours,
            ),
            recent_search_limit: parse_or(
                "SNAPFLOW_RECENT_SEARCHES",
                &lookup,
                |s| positive(s.parse::<usize>()?),
                default.recent_search_limit,
            ),
        }
    }

    pub fn story_ttl(&self) -> chrono::Duration { chrono::Duration::hours(self.story_ttl_hours) }
}

fn positive<N: PartialOrd + Default + ::core::fmt::Display>(n: N) -> Result<N> {
    match n > N::default() {
        true => Ok(n),
        false => Err(anyhow!("expected a positive number, found {}", n)),
    }
}

fn parse_or<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    parse: impl Fn(&str) -> Result<T>,
    default: T,
) -> T {
    let raw = match lookup(key) {
        Some(raw) => raw,
        None => return default,
    };

    match parse(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("ignoring `{}={}`: {}", key, raw, e);
            default
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyConfig {
    Off,
    Fixed { short_ms: u64, long_ms: u64 },
}

impl LatencyConfig {
    /// Round trips of a remote backend: 200 ms lookups, 300 ms scans and writes.
    pub const REMOTE: LatencyConfig = LatencyConfig::Fixed {
        short_ms: 200,
        long_ms: 300,
    };

    /// Accepts `off`, `0`, a single delay (`250`) or `short,long` (`200,300`).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("off") || s == "0" {
            return Ok(LatencyConfig::Off);
        }

        let mut parts = s.split(',').map(|p| p.trim().parse::<u64>());
        let cfg = match (parts.next(), parts.next(), parts.next()) {
            (Some(one), None, None) => {
                let ms = one?;
                LatencyConfig::Fixed {
                    short_ms: ms,
                    long_ms: ms,
                }
            },
            (Some(short), Some(long), None) => LatencyConfig::Fixed {
                short_ms: short?,
                long_ms: long?,
            },
            _ => return Err(anyhow!("expected `off`, `<ms>` or `<short ms>,<long ms>`")),
        };

        Ok(cfg)
    }

    pub fn build(&self) -> Arc<dyn Latency + Sync + Send> {
        match *self {
            LatencyConfig::Off => Arc::new(NoLatency),
            LatencyConfig::Fixed { short_ms, long_ms } => Arc::new(FixedLatency {
                short: Duration::from_millis(short_ms),
                long: Duration::from_millis(long_ms),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_in(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.namespace, "snapflow");
        assert_eq!(config.story_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_in(&[
            ("SNAPFLOW_NAMESPACE", "demo"),
            ("SNAPFLOW_LATENCY_MS", "200,300"),
            ("SNAPFLOW_STORY_TTL_HOURS", "12"),
            ("SNAPFLOW_RECENT_SEARCHES", "8"),
        ]));

        assert_eq!(config.namespace, "demo");
        assert_eq!(config.latency, LatencyConfig::REMOTE);
        assert_eq!(config.story_ttl_hours, 12);
        assert_eq!(config.recent_search_limit, 8);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_in(&[
            ("SNAPFLOW_NAMESPACE", "../up"),
            ("SNAPFLOW_LATENCY_MS", "fast"),
            ("SNAPFLOW_STORY_TTL_HOURS", "-3"),
            ("SNAPFLOW_RECENT_SEARCHES", "0"),
        ]));

        assert_eq!(config, Config::default());
    }

    #[test]
    fn latency_forms() {
        assert_eq!(LatencyConfig::parse("off").unwrap(), LatencyConfig::Off);
        assert_eq!(LatencyConfig::parse("0").unwrap(), LatencyConfig::Off);
        assert_eq!(
            LatencyConfig::parse("250").unwrap(),
            LatencyConfig::Fixed {
                short_ms: 250,
                long_ms: 250
            }
        );
        assert_eq!(LatencyConfig::parse(" 200 , 300 ").unwrap(), LatencyConfig::REMOTE);
        assert!(LatencyConfig::parse("1,2,3").is_err());
        assert!(LatencyConfig::parse("a,b").is_err());
    }
}
