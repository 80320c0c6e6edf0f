use sqlx::PgPool;
use storage::{
    dto::scoring_system::{EffectiveCodeResponse, ScoringSystemResponse},
    error::Result,
    repository::scoring_system::ScoringSystemRepository,
    services::results,
};
use uuid::Uuid;

pub async fn list_scoring_systems(pool: &PgPool) -> Result<Vec<ScoringSystemResponse>> {
    let systems = ScoringSystemRepository::new(pool).list().await?;
    Ok(systems.iter().map(ScoringSystemResponse::from).collect())
}

pub async fn get_scoring_system(pool: &PgPool, system_id: Uuid) -> Result<ScoringSystemResponse> {
    let system = ScoringSystemRepository::new(pool).find_by_id(system_id).await?;
    Ok(ScoringSystemResponse::from(&system))
}

/// The system's effective code set after walking its inheritance chain.
pub async fn effective_codes(
    pool: &PgPool,
    system_id: Uuid,
) -> Result<Vec<EffectiveCodeResponse>> {
    let rules = results::effective_rule_set(pool, system_id).await?;
    Ok(rules.codes().map(EffectiveCodeResponse::from).collect())
}
