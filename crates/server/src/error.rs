//! HTTP mapping of reader failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use broadsheet_core::{BroadsheetError, escape_html};
use serde_json::json;
use tracing::{error, warn};

/// A reader failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct AppError {
    error: BroadsheetError,
    json: bool,
}

impl AppError {
    /// Rendered as a small HTML page.
    pub fn page(error: BroadsheetError) -> Self {
        Self { error, json: false }
    }

    /// Rendered as `{"error": ..., "status": ...}`.
    pub fn api(error: BroadsheetError) -> Self {
        Self { error, json: true }
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }
}

pub fn status_for(error: &BroadsheetError) -> StatusCode {
    match error {
        BroadsheetError::InvalidUrl(_) | BroadsheetError::UnsupportedScheme(_) => StatusCode::BAD_REQUEST,
        BroadsheetError::DomainNotAllowed(_) => StatusCode::FORBIDDEN,
        BroadsheetError::HttpError(_)
        | BroadsheetError::HttpStatus { .. }
        | BroadsheetError::TooManyRedirects { .. } => StatusCode::BAD_GATEWAY,
        BroadsheetError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.error.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        if self.json {
            return (status, Json(json!({ "error": message, "status": status.as_u16() }))).into_response();
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\n<body style=\"font-family: Georgia, serif; max-width: 40em; margin: 3em auto; padding: 0 1em;\">\n<h1>{code} {reason}</h1>\n<p>{}</p>\n<p><a href=\"/\">Try another page</a></p>\n</body>\n</html>\n",
            escape_html(&message),
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}
