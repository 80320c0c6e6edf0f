use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ResultsSnapshot, SeriesResults};

/// Repository for computed-results snapshots. Snapshots are versioned
/// with an `is_current` flag; the engine itself never writes here.
pub struct ResultsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn current(&self, series_id: Uuid) -> Result<Option<ResultsSnapshot>> {
        let snapshot = sqlx::query_as::<_, ResultsSnapshot>(
            r#"
            SELECT snapshot_id, series_id, is_current, results, created_at
            FROM series_results_snapshots
            WHERE series_id = $1 AND is_current = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(series_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(snapshot)
    }

    /// Stores a fresh snapshot and retires the previous current one in
    /// the same transaction.
    pub async fn save(&self, series_id: Uuid, results: &SeriesResults) -> Result<ResultsSnapshot> {
        let payload = serde_json::to_string(results)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE series_results_snapshots
            SET is_current = FALSE
            WHERE series_id = $1 AND is_current = TRUE
            "#,
        )
        .bind(series_id)
        .execute(&mut *tx)
        .await?;

        let snapshot = sqlx::query_as::<_, ResultsSnapshot>(
            r#"
            INSERT INTO series_results_snapshots (snapshot_id, series_id, is_current, results)
            VALUES (gen_random_uuid(), $1, TRUE, $2)
            RETURNING snapshot_id, series_id, is_current, results, created_at
            "#,
        )
        .bind(series_id)
        .bind(payload)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(snapshot)
    }
}
