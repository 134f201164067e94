//! JSON classification endpoint (`POST /v1/classify`).

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::classifier::{ClassificationResult, ClassifyError};
use crate::server::{AppState, ServerError};
use crate::utils::truncate_text;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

fn status_for(err: &ClassifyError) -> StatusCode {
    if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}

pub async fn classify_handler(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassificationResult>, ServerError> {
    let text = truncate_text(&req.text, state.input_policy);
    let result = state
        .classifier
        .classify(&text)
        .await
        .map_err(|e| ServerError::new(status_for(&e), e))?;
    Ok(Json(result))
}
