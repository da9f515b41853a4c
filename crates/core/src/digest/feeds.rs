//! Headline polling from RSS and Atom feeds.

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use serde::Serialize;
use tracing::debug;

use super::config::FeedSource;
use crate::fetch::{FetchConfig, fetch_bytes};
use crate::{BroadsheetError, Result};

/// One headline for the paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    /// Name of the feed it came from.
    pub source: String,
    pub published: Option<DateTime<Utc>>,
}

/// Parses feed bytes into at most `limit` headlines, newest first.
///
/// Entries without a title or a link are skipped. Undated entries sort after
/// dated ones and keep their feed order.
pub fn parse_headlines(data: &[u8], source: &FeedSource, limit: usize) -> Result<Vec<Headline>> {
    let feed = feed_rs::parser::parse(data).map_err(|e| BroadsheetError::FeedError(format!("{}: {e}", source.name)))?;

    let mut headlines: Vec<Headline> = feed.entries.iter().filter_map(|entry| map_entry(entry, source)).collect();
    headlines.sort_by(|a, b| b.published.cmp(&a.published));
    headlines.truncate(limit);

    debug!(source = %source.name, entries = feed.entries.len(), kept = headlines.len(), "parsed feed");

    Ok(headlines)
}

/// Fetches a feed and parses its headlines.
pub async fn fetch_headlines(source: &FeedSource, limit: usize, fetch: &FetchConfig) -> Result<Vec<Headline>> {
    let data = fetch_bytes(&source.url, fetch).await?;
    parse_headlines(&data, source, limit)
}

fn map_entry(entry: &Entry, source: &FeedSource) -> Option<Headline> {
    let title = entry.title.as_ref()?.content.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return None;
    }

    let link = pick_link(&entry.links)?;

    Some(Headline { title, link, source: source.name.clone(), published: entry.published.or(entry.updated) })
}

/// Prefers the `alternate` link, falling back to the first one
fn pick_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}
