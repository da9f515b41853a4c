use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Method, Request};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use broadsheet_core::{BroadsheetError, ExtractionResult, Reader, render_reader_page};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::AppError;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Broadsheet</title>
</head>
<body style="margin: 0; background: #faf8f3; color: #222; font: 19px/1.6 Georgia, 'Times New Roman', serif;">
<main style="max-width: 40em; margin: 0 auto; padding: 3em 1.25em;">
<h1>Broadsheet</h1>
<p>Paste a link to read it without the clutter.</p>
<form action="/read" method="get">
<input type="url" name="url" required placeholder="https://" style="width: 100%; font: inherit; padding: 0.4em; box-sizing: border-box;">
<p><button type="submit" style="font: inherit; padding: 0.3em 1.2em;">Read</button></p>
</form>
</main>
</body>
</html>
"#;

#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<Reader>,
}

impl AppState {
    pub fn new(reader: Reader) -> Self {
        Self { reader: Arc::new(reader) }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    url: Option<String>,
}

impl ReadQuery {
    fn target(&self) -> Result<&str, BroadsheetError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BroadsheetError::InvalidUrl("missing url parameter".to_string()))
    }
}

/// Builds the application with its middleware stack.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api_cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    let api = Router::new().route("/api/read", get(read_api)).layer(api_cors);

    Router::new()
        .route("/", get(index))
        .route("/read", get(read_page))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> &'static str {
    "ok"
}

async fn read_page(State(state): State<AppState>, Query(query): Query<ReadQuery>) -> Result<Html<String>, AppError> {
    let url = query.target().map_err(AppError::page)?;
    let result = state.reader.read(url).await.map_err(AppError::page)?;
    Ok(Html(render_reader_page(&result)))
}

async fn read_api(
    State(state): State<AppState>, Query(query): Query<ReadQuery>,
) -> Result<Json<ExtractionResult>, AppError> {
    let url = query.target().map_err(AppError::api)?;
    let result = state.reader.read(url).await.map_err(AppError::api)?;
    Ok(Json(result))
}
