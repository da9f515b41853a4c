//! Digest job configuration.
//!
//! Loaded from a JSON file, by default `~/.config/broadsheet/digest.json`.
//! The email API key never lives in the file; it is read from the
//! environment variable named by [`EmailConfig::api_key_env`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::{BroadsheetError, Result};

/// A news feed to pull headlines from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    /// Display name used as the section heading.
    pub name: String,
    /// RSS or Atom URL.
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }
}

/// Where the weather and sun times are looked up for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Offset applied when printing times and the edition date.
    pub utc_offset_minutes: i32,
}

impl Default for Location {
    fn default() -> Self {
        Self { name: "London".to_string(), latitude: 51.5072, longitude: -0.1276, utc_offset_minutes: 0 }
    }
}

impl Location {
    /// The configured offset; must stay strictly within a day either way.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| BroadsheetError::ConfigError(format!("invalid UTC offset: {} minutes", self.utc_offset_minutes)))
    }
}

/// Base URLs of the sidebar lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarEndpoints {
    /// Open-Meteo forecast endpoint.
    pub weather: String,
    /// sunrise-sunset.org endpoint.
    pub sun: String,
    /// Open Notify people-in-space endpoint.
    pub astronauts: String,
}

impl Default for SidebarEndpoints {
    fn default() -> Self {
        Self {
            weather: "https://api.open-meteo.com/v1/forecast".to_string(),
            sun: "https://api.sunrise-sunset.org/json".to_string(),
            astronauts: "http://api.open-notify.org/astros.json".to_string(),
        }
    }
}

/// Transactional email API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Endpoint accepting `{from, to, subject, html}` JSON with a bearer token.
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub from: String,
    pub to: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key_env: "BROADSHEET_EMAIL_API_KEY".to_string(),
            from: "Broadsheet <digest@localhost>".to_string(),
            to: Vec::new(),
        }
    }
}

impl EmailConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(BroadsheetError::ConfigError(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

/// Everything the digest job needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Masthead and subject line.
    pub title: String,
    pub feeds: Vec<FeedSource>,
    pub headlines_per_feed: usize,
    pub location: Location,
    pub endpoints: SidebarEndpoints,
    pub email: EmailConfig,
    /// HTTP timeout in seconds for every lookup.
    pub timeout: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: "The Daily Broadsheet".to_string(),
            feeds: vec![
                FeedSource::new("BBC World", "https://feeds.bbci.co.uk/news/world/rss.xml"),
                FeedSource::new("The Guardian", "https://www.theguardian.com/world/rss"),
                FeedSource::new("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
                FeedSource::new("NPR World", "https://feeds.npr.org/1004/rss.xml"),
            ],
            headlines_per_feed: 5,
            location: Location::default(),
            endpoints: SidebarEndpoints::default(),
            email: EmailConfig::default(),
            timeout: 20,
        }
    }
}

impl DigestConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BroadsheetError::FileNotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| BroadsheetError::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config location (~/.config/broadsheet/digest.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("broadsheet").join("digest.json"))
    }

    /// Rejects configurations the job cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(BroadsheetError::ConfigError("at least one feed is required".to_string()));
        }

        if self.headlines_per_feed == 0 {
            return Err(BroadsheetError::ConfigError("headlines_per_feed must be positive".to_string()));
        }

        if let Some(feed) = self.feeds.iter().find(|f| url::Url::parse(&f.url).is_err()) {
            return Err(BroadsheetError::ConfigError(format!("feed {} has an invalid URL", feed.name)));
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) || !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(BroadsheetError::ConfigError("location coordinates are out of range".to_string()));
        }

        self.location.utc_offset()?;

        Ok(())
    }
}
