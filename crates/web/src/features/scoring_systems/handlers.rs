use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::scoring_system::{EffectiveCodeResponse, ScoringSystemResponse},
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/scoring-systems",
    responses(
        (status = 200, description = "List all scoring systems", body = Vec<ScoringSystemResponse>)
    ),
    tag = "scoring-systems"
)]
pub async fn list_scoring_systems(State(db): State<Database>) -> Result<Response, WebError> {
    let response = services::list_scoring_systems(db.pool()).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scoring-systems/{system_id}",
    params(
        ("system_id" = Uuid, Path, description = "Scoring system ID")
    ),
    responses(
        (status = 200, description = "Scoring system", body = ScoringSystemResponse),
        (status = 404, description = "Scoring system not found")
    ),
    tag = "scoring-systems"
)]
pub async fn get_scoring_system(
    State(db): State<Database>,
    Path(system_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::get_scoring_system(db.pool(), system_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scoring-systems/{system_id}/codes",
    params(
        ("system_id" = Uuid, Path, description = "Scoring system ID")
    ),
    responses(
        (status = 200, description = "Effective codes after inheritance merging", body = Vec<EffectiveCodeResponse>),
        (status = 422, description = "Invalid scoring system configuration")
    ),
    tag = "scoring-systems"
)]
pub async fn get_effective_codes(
    State(db): State<Database>,
    Path(system_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::effective_codes(db.pool(), system_id).await?;

    Ok(Json(response).into_response())
}
