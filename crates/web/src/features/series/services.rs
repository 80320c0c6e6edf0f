use std::collections::HashMap;

use sqlx::PgPool;
use storage::{
    dto::results::{
        CompetitorInfo, RaceColumn, ScoreCell, SeriesInfo, SeriesResultsResponse, StandingRow,
    },
    dto::series::SeriesResponse,
    error::Result,
    models::{Competitor, Series, SeriesResults},
    repository::series::SeriesRepository,
    services::results,
    services::scoring::WhatIfOverrides,
};
use uuid::Uuid;

pub async fn list_series(pool: &PgPool) -> Result<Vec<SeriesResponse>> {
    let series = SeriesRepository::new(pool).list().await?;
    Ok(series.iter().map(SeriesResponse::from).collect())
}

/// Current standings: the stored snapshot when one exists, otherwise a
/// fresh computation.
pub async fn series_results(pool: &PgPool, series_id: Uuid) -> Result<SeriesResultsResponse> {
    let series = SeriesRepository::new(pool).find_by_id(series_id).await?;
    let results = results::current_results(pool, series_id).await?;
    assemble_response(pool, &series, results).await
}

/// Recomputes the standings and stores them as the new current snapshot.
pub async fn recompute_series_results(
    pool: &PgPool,
    series_id: Uuid,
) -> Result<SeriesResultsResponse> {
    let series = SeriesRepository::new(pool).find_by_id(series_id).await?;
    let results = results::recompute_and_store(pool, series_id).await?;
    assemble_response(pool, &series, results).await
}

/// Speculative standings under overridden rules; persists nothing.
pub async fn what_if(
    pool: &PgPool,
    series_id: Uuid,
    overrides: WhatIfOverrides,
) -> Result<SeriesResultsResponse> {
    let series = SeriesRepository::new(pool).find_by_id(series_id).await?;
    let results = results::run_what_if(pool, series_id, &overrides).await?;
    assemble_response(pool, &series, results).await
}

/// Joins competitor identity onto the computed standings for display.
async fn assemble_response(
    pool: &PgPool,
    series: &Series,
    results: SeriesResults,
) -> Result<SeriesResultsResponse> {
    let competitors = SeriesRepository::new(pool)
        .competitors_for(series.series_id)
        .await?;
    let by_id: HashMap<Uuid, &Competitor> = competitors
        .iter()
        .map(|c| (c.competitor_id, c))
        .collect();

    let races = results
        .races
        .iter()
        .map(|r| RaceColumn {
            race_id: r.race_id,
            name: r.name.clone(),
            date: r.date,
            order_key: r.order_key,
        })
        .collect();

    let standings = results
        .standings
        .iter()
        .map(|standing| StandingRow {
            rank: standing.rank,
            competitor: competitor_info(standing.competitor_id, &by_id),
            total: standing.total,
            trend: standing.trend,
            scores: standing
                .scores
                .iter()
                .map(|s| ScoreCell {
                    race_id: s.race_id,
                    place: s.place,
                    code: s.code.clone(),
                    points: s.points,
                    discarded: s.discarded,
                })
                .collect(),
        })
        .collect();

    Ok(SeriesResultsResponse {
        series: SeriesInfo {
            series_id: series.series_id,
            name: series.name.clone(),
            slug: series.slug.clone(),
            series_type: series.series_type.clone(),
            scoring_system_id: results.scoring_system_id,
        },
        races_completed: results.races_completed,
        races,
        standings,
    })
}

fn competitor_info(id: Uuid, by_id: &HashMap<Uuid, &Competitor>) -> CompetitorInfo {
    match by_id.get(&id) {
        Some(c) => CompetitorInfo {
            competitor_id: c.competitor_id,
            name: c.name.clone(),
            sail_number: c.sail_number.clone(),
            boat_class: c.boat_class.clone(),
        },
        None => CompetitorInfo {
            competitor_id: id,
            name: String::new(),
            sail_number: String::new(),
            boat_class: None,
        },
    }
}
