use crate::consts::{DEFAULT_BIND_ADDR, DEFAULT_PORT, DEFAULT_TICK_INTERVAL_MILLIS};
use crate::error::ConfigError;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings, read from the environment (and `.env`, when present) at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub tick_interval: Duration,
    /// Fixed seed for the call-quality jitter; `None` seeds from entropy.
    pub quality_seed: Option<u64>,
    pub seed_profiles: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from(DEFAULT_BIND_ADDR),
            port: DEFAULT_PORT,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MILLIS),
            quality_seed: None,
            seed_profiles: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let tick_millis = parse_var(&lookup, "TICK_INTERVAL_MILLIS")?
            .unwrap_or(DEFAULT_TICK_INTERVAL_MILLIS);
        if tick_millis == 0 {
            return Err(ConfigError::Invalid {
                key: "TICK_INTERVAL_MILLIS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            tick_interval: Duration::from_millis(tick_millis),
            quality_seed: parse_var(&lookup, "QUALITY_SEED")?,
            seed_profiles: parse_var(&lookup, "SEED_PROFILES")?.unwrap_or(defaults.seed_profiles),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
