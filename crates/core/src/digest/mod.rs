//! The morning paper: headlines from a set of feeds plus a small sidebar,
//! rendered as one HTML email.
//!
//! ```no_run
//! use broadsheet_core::digest::{DigestConfig, build_newsletter, render_newsletter};
//!
//! # async fn example() -> broadsheet_core::Result<()> {
//! let config = DigestConfig::load_default()?;
//! let paper = build_newsletter(&config, chrono::Utc::now()).await?;
//! println!("{}", render_newsletter(&paper));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod feeds;
pub mod mailer;
pub mod newsletter;
pub mod sidebar;

pub use config::{DigestConfig, EmailConfig, FeedSource, Location, SidebarEndpoints};
pub use feeds::{Headline, fetch_headlines, parse_headlines};
pub use mailer::{Email, send_email};
pub use newsletter::{Newsletter, Section, render_newsletter};
pub use sidebar::{Astronaut, Sidebar, SunTimes, Weather, fetch_sidebar};

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::fetch::FetchConfig;
use crate::{BroadsheetError, Result};

/// Fetches every feed and the sidebar concurrently and assembles an edition.
///
/// Feeds that fail or come back empty are left out. Sections keep the order
/// the feeds are configured in.
///
/// # Errors
///
/// Returns [`BroadsheetError::NoHeadlines`] when no feed produced a headline.
#[instrument(level = "info", skip_all, fields(feeds = config.feeds.len()))]
pub async fn build_newsletter(config: &DigestConfig, now: DateTime<Utc>) -> Result<Newsletter> {
    config.validate()?;

    let fetch = FetchConfig { timeout: config.timeout, ..Default::default() };
    let offset = config.location.utc_offset()?;

    let (sections, sidebar) = tokio::join!(gather_sections(config, &fetch), fetch_sidebar(config, &fetch));

    if sections.is_empty() {
        return Err(BroadsheetError::NoHeadlines);
    }

    let paper = Newsletter {
        title: config.title.clone(),
        edition: now.with_timezone(&offset),
        location: config.location.name.clone(),
        sections,
        sidebar,
    };
    info!(headlines = paper.headline_count(), sections = paper.sections.len(), "edition built");

    Ok(paper)
}

/// Builds the email for an edition.
pub fn compose_email(config: &DigestConfig, paper: &Newsletter) -> Email {
    Email {
        from: config.email.from.clone(),
        to: config.email.to.clone(),
        subject: paper.subject_line(),
        html: render_newsletter(paper),
    }
}

/// Sends an edition using the API key from the configured environment variable.
pub async fn send_newsletter(config: &DigestConfig, paper: &Newsletter) -> Result<String> {
    let api_key = config.email.api_key()?;
    let fetch = FetchConfig { timeout: config.timeout, ..Default::default() };
    send_email(&config.email, &api_key, &compose_email(config, paper), &fetch).await
}

async fn gather_sections(config: &DigestConfig, fetch: &FetchConfig) -> Vec<Section> {
    let mut tasks = JoinSet::new();
    for (index, source) in config.feeds.iter().cloned().enumerate() {
        let fetch = fetch.clone();
        let limit = config.headlines_per_feed;
        tasks.spawn(async move {
            let result = fetch_headlines(&source, limit, &fetch).await;
            (index, source, result)
        });
    }

    let mut sections = Vec::with_capacity(config.feeds.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, source, Ok(headlines))) if !headlines.is_empty() => {
                sections.push((index, Section { source: source.name, headlines }));
            }
            Ok((_, source, Ok(_))) => warn!(feed = %source.name, "feed had no usable entries"),
            Ok((_, source, Err(err))) => warn!(feed = %source.name, error = %err, "feed fetch failed"),
            Err(err) => warn!(error = %err, "feed task panicked"),
        }
    }

    sections.sort_by_key(|(index, _)| *index);
    sections.into_iter().map(|(_, section)| section).collect()
}
