use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ScoreCode, ScoringSystem};
use crate::services::scoring::ScoringSystemGraph;

/// Repository for scoring systems and their score codes.
pub struct ScoringSystemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoringSystemRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<ScoringSystem>> {
        let systems = sqlx::query_as::<_, ScoringSystem>(
            r#"
            SELECT system_id, name, discard_pattern, participation_percent,
                   parent_system_id, created_at
            FROM scoring_systems
            ORDER BY name, created_at
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(systems)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<ScoringSystem> {
        let system = sqlx::query_as::<_, ScoringSystem>(
            r#"
            SELECT system_id, name, discard_pattern, participation_percent,
                   parent_system_id, created_at
            FROM scoring_systems
            WHERE system_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(system)
    }

    pub async fn codes_for(&self, system_id: Uuid) -> Result<Vec<ScoreCode>> {
        let codes = sqlx::query_as::<_, ScoreCode>(
            r#"
            SELECT code_id, system_id, name, formula, formula_value, score_like,
                   discardable, came_to_start, started, finished,
                   preserve_result, adjust_other_scores, count_as_participation
            FROM score_codes
            WHERE system_id = $1
            ORDER BY name
            "#,
        )
        .bind(system_id)
        .fetch_all(self.pool)
        .await?;

        Ok(codes)
    }

    /// Prefetches every system reachable from the given leaves by
    /// following parent references, so the resolver can walk the chains
    /// without further queries. The walk stops on ids already loaded;
    /// cycle and missing-parent detection stays with the resolver.
    pub async fn load_graph(&self, leaf_ids: &[Uuid]) -> Result<ScoringSystemGraph> {
        let mut graph = ScoringSystemGraph::default();
        for &leaf in leaf_ids {
            let mut next = Some(leaf);
            while let Some(id) = next {
                if graph.contains(id) {
                    break;
                }
                let system = match self.find_by_id(id).await {
                    Ok(system) => system,
                    // Leave the hole for the resolver to report as a
                    // configuration error with context.
                    Err(StorageError::NotFound) => break,
                    Err(e) => return Err(e),
                };
                let codes = self.codes_for(id).await?;
                next = system.parent_system_id;
                graph.insert_system(system, codes);
            }
        }
        Ok(graph)
    }
}
