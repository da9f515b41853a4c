//! Server settings from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use broadsheet_core::{BroadsheetError, DomainAllowlist, ReaderConfig, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Hosts the reader may fetch from; empty admits all.
    pub allowlist: DomainAllowlist,
    /// Per-fetch timeout in seconds.
    pub fetch_timeout: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            allowlist: DomainAllowlist::default(),
            fetch_timeout: 30,
            request_timeout: 45,
        }
    }
}

impl ServerConfig {
    /// Reads `BROADSHEET_ADDR`, `BROADSHEET_ALLOWED_DOMAINS`,
    /// `BROADSHEET_FETCH_TIMEOUT` and `BROADSHEET_REQUEST_TIMEOUT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let addr = match value("BROADSHEET_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|_| BroadsheetError::ConfigError(format!("BROADSHEET_ADDR is not a socket address: {raw}")))?,
            None => defaults.addr,
        };

        let allowlist = value("BROADSHEET_ALLOWED_DOMAINS").map(|raw| DomainAllowlist::from_csv(&raw)).unwrap_or_default();

        let fetch_timeout = parse_secs("BROADSHEET_FETCH_TIMEOUT", value("BROADSHEET_FETCH_TIMEOUT"), defaults.fetch_timeout)?;
        let request_timeout =
            parse_secs("BROADSHEET_REQUEST_TIMEOUT", value("BROADSHEET_REQUEST_TIMEOUT"), defaults.request_timeout)?;

        Ok(Self { addr, allowlist, fetch_timeout, request_timeout })
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig::builder().timeout(self.fetch_timeout).allowlist(self.allowlist.clone()).build()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(BroadsheetError::ConfigError(format!("{key} must be a positive number of seconds, got {raw}"))),
        },
    }
}
