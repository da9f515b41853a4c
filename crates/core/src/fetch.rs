//! Content fetching from URLs, files, and stdin.
//!
//! This module provides functions for retrieving HTML content from
//! HTTP/HTTPS URLs, local files, and standard input.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use crate::allowlist::{DomainAllowlist, validate_url};
use crate::{BroadsheetError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent for the first attempt.
    pub user_agent: String,
    /// User-Agent for the single fallback attempt after an empty extraction.
    pub fallback_user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Broadsheet/0.1; +https://github.com/broadsheet/broadsheet)"
                .to_string(),
            fallback_user_agent:
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                    .to_string(),
        }
    }
}

impl FetchConfig {
    /// Copy of this config that sends the fallback User-Agent.
    pub fn fallback(&self) -> Self {
        Self { user_agent: self.fallback_user_agent.clone(), ..self.clone() }
    }

    pub(crate) fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(BroadsheetError::HttpError)
    }

    fn redirectless_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .user_agent(self.user_agent.as_str())
            .redirect(Policy::none())
            .build()
            .map_err(BroadsheetError::HttpError)
    }

    pub(crate) fn map_send_error(&self, err: reqwest::Error) -> BroadsheetError {
        if err.is_timeout() { BroadsheetError::Timeout { timeout: self.timeout } } else { BroadsheetError::HttpError(err) }
    }
}

/// Redirect hops followed before a fetch gives up.
pub const MAX_REDIRECTS: usize = 10;

/// Fetches HTML content from a URL.
///
/// Performs an HTTP GET, follows redirects and returns the body as text.
/// Non-success statuses are reported as [`BroadsheetError::HttpStatus`].
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    fetch_url_within(url, config, &DomainAllowlist::default()).await
}

/// Fetches HTML content from a URL without leaving the allowlist.
///
/// Redirects are followed by hand so that every `Location` goes through
/// [`validate_url`] and [`DomainAllowlist::check`] before it is requested. A
/// redirect to a blocked host ends the fetch with
/// [`BroadsheetError::DomainNotAllowed`].
pub async fn fetch_url_within(url: &str, config: &FetchConfig, allowlist: &DomainAllowlist) -> Result<String> {
    let mut current = Url::parse(url).map_err(|e| BroadsheetError::InvalidUrl(e.to_string()))?;
    allowlist.check(&current)?;

    let client = config.redirectless_client()?;

    for _ in 0..=MAX_REDIRECTS {
        debug!(url = %current, user_agent = %config.user_agent, "fetching page");

        let response = client
            .get(current.clone())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| config.map_send_error(e))?;

        let status = response.status();
        if status.is_redirection()
            && let Some(location) = response.headers().get(LOCATION)
        {
            let location = location
                .to_str()
                .map_err(|_| BroadsheetError::InvalidUrl(format!("unreadable redirect from {current}")))?;
            let next = current.join(location).map_err(|e| BroadsheetError::InvalidUrl(e.to_string()))?;
            let next = validate_url(next.as_str())?;
            allowlist.check(&next)?;

            debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");
            current = next;
            continue;
        }

        if !status.is_success() {
            return Err(BroadsheetError::HttpStatus { status: status.as_u16(), url: current.to_string() });
        }

        let content = response.text().await.map_err(|e| config.map_send_error(e))?;
        debug!(bytes = content.len(), "fetched page");

        return Ok(content);
    }

    Err(BroadsheetError::TooManyRedirects { url: url.to_string(), limit: MAX_REDIRECTS })
}

/// Fetches raw bytes from a URL (used for feeds, whose encoding is declared in the XML).
pub async fn fetch_bytes(url: &str, config: &FetchConfig) -> Result<Vec<u8>> {
    let parsed_url = Url::parse(url).map_err(|e| BroadsheetError::InvalidUrl(e.to_string()))?;
    let response = config.client()?.get(parsed_url).send().await.map_err(|e| config.map_send_error(e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BroadsheetError::HttpStatus { status: status.as_u16(), url: url.to_string() });
    }

    let bytes = response.bytes().await.map_err(|e| config.map_send_error(e))?;
    Ok(bytes.to_vec())
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(BroadsheetError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(BroadsheetError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(BroadsheetError::from)?;

    Ok(buffer)
}
