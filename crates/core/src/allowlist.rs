//! URL validation and the reader's domain allowlist.

use std::collections::HashSet;

use url::Url;

use crate::{BroadsheetError, Result};

/// Parses user input into an http(s) URL.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::validate_url;
///
/// assert!(validate_url("https://example.com/story").is_ok());
/// assert!(validate_url("example.com").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim()).map_err(|e| BroadsheetError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(BroadsheetError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(BroadsheetError::InvalidUrl(format!("{input} has no host")));
    }

    Ok(url)
}

/// Set of hosts the reader is willing to fetch from.
///
/// Membership is exact on the lowercased host with any leading `www.`
/// removed, so `www.example.com` and `example.com` are the same entry but
/// `news.example.com` is not. An empty allowlist admits every host.
#[derive(Debug, Clone, Default)]
pub struct DomainAllowlist {
    domains: HashSet<String>,
}

impl DomainAllowlist {
    /// Creates an allowlist from host names.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| canonical_host(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Parses a comma separated list such as `example.com, bbc.co.uk`.
    pub fn from_csv(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Whether the allowlist admits every host.
    pub fn is_open(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Checks a URL's host against the allowlist.
    pub fn is_allowed(&self, url: &Url) -> bool {
        if self.is_open() {
            return true;
        }

        url.host_str().is_some_and(|host| self.domains.contains(&canonical_host(host)))
    }

    /// Returns an error naming the host when it is not allowed.
    pub fn check(&self, url: &Url) -> Result<()> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(BroadsheetError::DomainNotAllowed(url.host_str().unwrap_or_default().to_string()))
        }
    }
}

fn canonical_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
