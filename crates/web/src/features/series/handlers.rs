use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{results::SeriesResultsResponse, series::SeriesResponse, what_if::WhatIfRequest},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/series",
    responses(
        (status = 200, description = "List all series", body = Vec<SeriesResponse>)
    ),
    tag = "series"
)]
pub async fn list_series(State(db): State<Database>) -> Result<Response, WebError> {
    let response = services::list_series(db.pool()).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/series/{series_id}/results",
    params(
        ("series_id" = Uuid, Path, description = "Series ID")
    ),
    responses(
        (status = 200, description = "Current standings for the series", body = SeriesResultsResponse),
        (status = 404, description = "Series not found"),
        (status = 422, description = "Scoring configuration or data error")
    ),
    tag = "series"
)]
pub async fn get_series_results(
    State(db): State<Database>,
    Path(series_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::series_results(db.pool(), series_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/series/{series_id}/results/recompute",
    params(
        ("series_id" = Uuid, Path, description = "Series ID")
    ),
    responses(
        (status = 200, description = "Standings recomputed and stored", body = SeriesResultsResponse),
        (status = 404, description = "Series not found"),
        (status = 422, description = "Scoring configuration or data error")
    ),
    tag = "series"
)]
pub async fn recompute_series_results(
    State(db): State<Database>,
    Path(series_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::recompute_series_results(db.pool(), series_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/series/{series_id}/what-if",
    params(
        ("series_id" = Uuid, Path, description = "Series ID")
    ),
    request_body = WhatIfRequest,
    responses(
        (status = 200, description = "Standings under the overrides; nothing is persisted", body = SeriesResultsResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Series not found"),
        (status = 422, description = "Scoring configuration or data error")
    ),
    tag = "series"
)]
pub async fn what_if(
    State(db): State<Database>,
    Path(series_id): Path<Uuid>,
    Json(payload): Json<WhatIfRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;
    payload.check_participation().map_err(WebError::BadRequest)?;

    let response = services::what_if(db.pool(), series_id, payload.into_overrides()).await?;

    Ok(Json(response).into_response())
}
