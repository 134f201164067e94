use axum::{
    extract::{DefaultBodyLimit, Json},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use anyhow::Result;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::services;
use crate::utils::TruncationPolicy;

/// Upload ceiling per request.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub struct ServerError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ServerError {
    pub fn new(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self { status, error: error.into() }
    }

    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": format!("{:#}", self.error) }))).into_response()
    }
}

impl<E> From<E> for ServerError where E: Into<anyhow::Error> {
    fn from(err: E) -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, err) }
}

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub pdf_pages: usize,
    /// Bound applied to text before it is sent to the model
    pub input_policy: TruncationPolicy,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>, config: &AppConfig) -> Self {
        Self {
            classifier,
            pdf_pages: config.pdf_pages,
            input_policy: TruncationPolicy::Tokens(config.max_input_tokens),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/classify", post(services::upload::classify_uploads))
        .route("/v1/classify", post(services::api::classify_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: &str) -> Result<()> {
    info!(
        model = %state.classifier.model(),
        categories = state.classifier.taxonomy().len(),
        pdf_pages = state.pdf_pages,
        "Starting classification server"
    );
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Document classification UI ready: http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> Html<String> {
    render_page(r#"<div class="info">👆 Please upload at least one .txt or .pdf file to analyze.</div>"#)
}

/// Wrap `body` in the page chrome with the upload form on top.
pub fn render_page(body: &str) -> Html<String> {
    // NOTE: literal CSS braces are doubled for format!.
    Html(format!(r####"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fileread Document Classification</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; max-width: 860px; margin: 40px auto; padding: 0 20px; color: #262730; }}
        h1 {{ font-weight: 700; }}
        form {{ border: 1px dashed #bbb; border-radius: 8px; padding: 20px; margin-bottom: 30px; background: #fafafa; }}
        .btn {{ background: #ff4b4b; color: #fff; border: none; padding: 8px 16px; border-radius: 6px; cursor: pointer; }}
        .file {{ border-top: 1px solid #eee; padding-top: 10px; margin-bottom: 30px; }}
        textarea {{ width: 100%; font-family: "SF Mono", monospace; font-size: 12px; background: #f0f2f6; border: none; border-radius: 6px; padding: 8px; }}
        .metrics {{ display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin: 15px 0; }}
        .metric .label {{ display: block; font-size: 13px; color: #808495; }}
        .metric .value {{ display: block; font-size: 30px; }}
        .info {{ background: #e8f0fe; color: #1c4b8c; padding: 14px; border-radius: 6px; }}
        .error {{ background: #fdecea; color: #7d1a1a; padding: 14px; border-radius: 6px; }}
        details summary {{ cursor: pointer; padding: 6px 0; }}
    </style>
</head>
<body>
    <h1>Fileread Document Classification</h1>
    <p>Upload one or more .txt or .pdf files to classify their legal context and subcategory.</p>
    <form action="/classify" method="post" enctype="multipart/form-data">
        <label for="files">Choose text or PDF files</label><br>
        <input type="file" id="files" name="files" accept=".txt,.pdf" multiple>
        <button class="btn" type="submit">Classify</button>
    </form>
    {}
</body>
</html>"####, body))
}
