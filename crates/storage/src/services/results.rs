use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::SeriesResults;
use crate::repository::results::ResultsRepository;
use crate::repository::scoring_system::ScoringSystemRepository;
use crate::repository::series::SeriesRepository;
use crate::services::scoring::{
    self, RuleSet, ScoringConfig, ScoringSystemGraph, SeriesData, WhatIfOverrides,
};

/// Computes live standings for a series from its persisted races and
/// scores. Nothing is stored.
pub async fn compute_results(pool: &PgPool, series_id: Uuid) -> Result<SeriesResults> {
    let (data, config, graph) = load_inputs(pool, series_id, None).await?;
    let results = scoring::compute_series_results(&data, &config, &graph)?;
    Ok(results)
}

/// The current snapshot when one exists, otherwise a fresh on-demand
/// computation (not stored).
pub async fn current_results(pool: &PgPool, series_id: Uuid) -> Result<SeriesResults> {
    if let Some(snapshot) = ResultsRepository::new(pool).current(series_id).await? {
        return Ok(snapshot.decode()?);
    }
    compute_results(pool, series_id).await
}

/// Recomputes standings and stores them as the new current snapshot.
pub async fn recompute_and_store(pool: &PgPool, series_id: Uuid) -> Result<SeriesResults> {
    let results = compute_results(pool, series_id).await?;
    ResultsRepository::new(pool).save(series_id, &results).await?;
    tracing::info!(
        %series_id,
        races = results.races_completed,
        standings = results.standings.len(),
        "stored results snapshot"
    );
    Ok(results)
}

/// Runs the scoring pipeline with the given overrides layered over the
/// series' live configuration, without persisting anything.
pub async fn run_what_if(
    pool: &PgPool,
    series_id: Uuid,
    overrides: &WhatIfOverrides,
) -> Result<SeriesResults> {
    let (data, live, graph) =
        load_inputs(pool, series_id, overrides.scoring_system_id).await?;
    let results = scoring::run_what_if(&data, &live, overrides, &graph)?;
    Ok(results)
}

/// The effective, inheritance-merged code set of a scoring system.
pub async fn effective_rule_set(pool: &PgPool, system_id: Uuid) -> Result<RuleSet> {
    let graph = ScoringSystemRepository::new(pool)
        .load_graph(&[system_id])
        .await?;
    let rules = scoring::resolve_rule_set(system_id, &graph)?;
    Ok(rules)
}

async fn load_inputs(
    pool: &PgPool,
    series_id: Uuid,
    extra_system: Option<Uuid>,
) -> Result<(SeriesData, ScoringConfig, ScoringSystemGraph)> {
    let data = SeriesRepository::new(pool).load_series_data(series_id).await?;

    let mut system_ids = vec![data.series.scoring_system_id];
    system_ids.extend(data.children.iter().map(|c| c.series.scoring_system_id));
    system_ids.extend(extra_system);
    let graph = ScoringSystemRepository::new(pool)
        .load_graph(&system_ids)
        .await?;

    let config = ScoringConfig::from_graph(data.series.scoring_system_id, &graph)?;
    Ok((data, config, graph))
}
