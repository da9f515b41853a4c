//! Delivery through a transactional email HTTP API.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::EmailConfig;
use crate::fetch::FetchConfig;
use crate::{BroadsheetError, Result};

/// Request body accepted by the email API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

/// Sends an email and returns the provider's message id.
pub async fn send_email(config: &EmailConfig, api_key: &str, email: &Email, fetch: &FetchConfig) -> Result<String> {
    if email.to.is_empty() {
        return Err(BroadsheetError::ConfigError("no email recipients configured".to_string()));
    }

    let response = fetch
        .client()?
        .post(&config.api_url)
        .bearer_auth(api_key)
        .json(email)
        .send()
        .await
        .map_err(|e| fetch.map_send_error(e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BroadsheetError::EmailError(format!("HTTP {}: {}", status.as_u16(), body.trim())));
    }

    let sent: SendResponse =
        response.json().await.map_err(|e| BroadsheetError::EmailError(format!("unexpected response: {e}")))?;
    info!(id = %sent.id, recipients = email.to.len(), "email sent");

    Ok(sent.id)
}
