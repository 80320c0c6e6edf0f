use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Competitor, Race, Score, Series, SeriesType};
use crate::services::scoring::SeriesData;

/// Repository for series, their races, scores and competitors.
pub struct SeriesRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeriesRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Series>> {
        let series = sqlx::query_as::<_, Series>(
            r#"
            SELECT series_id, name, slug, scoring_system_id, trend_option,
                   series_type, children_as_single_race, created_at
            FROM series
            ORDER BY created_at DESC, name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(series)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Series> {
        let series = sqlx::query_as::<_, Series>(
            r#"
            SELECT series_id, name, slug, scoring_system_id, trend_option,
                   series_type, children_as_single_race, created_at
            FROM series
            WHERE series_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(series)
    }

    /// Races in scoring order: date, then order key within the date.
    pub async fn races_for(&self, series_id: Uuid) -> Result<Vec<Race>> {
        let races = sqlx::query_as::<_, Race>(
            r#"
            SELECT race_id, series_id, name, date, order_key, status, created_at
            FROM races
            WHERE series_id = $1
            ORDER BY date, order_key, created_at
            "#,
        )
        .bind(series_id)
        .fetch_all(self.pool)
        .await?;

        Ok(races)
    }

    pub async fn scores_for_series(&self, series_id: Uuid) -> Result<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"
            SELECT s.score_id, s.race_id, s.competitor_id, s.place, s.code, s.code_points
            FROM scores s
            INNER JOIN races r ON s.race_id = r.race_id
            WHERE r.series_id = $1
            "#,
        )
        .bind(series_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    /// Every competitor with a result in the series, or, for a summary
    /// series, in any of its children. Creation order first, which is
    /// the ranking engine's deterministic last-resort tie-break.
    pub async fn competitors_for(&self, series_id: Uuid) -> Result<Vec<Competitor>> {
        let competitors = sqlx::query_as::<_, Competitor>(
            r#"
            SELECT competitor_id, name, sail_number, boat_class, created_at
            FROM competitors
            WHERE competitor_id IN (
                SELECT s.competitor_id
                FROM scores s
                INNER JOIN races r ON s.race_id = r.race_id
                WHERE r.series_id = $1
                   OR r.series_id IN (
                       SELECT child_series_id FROM series_children
                       WHERE parent_series_id = $1
                   )
            )
            ORDER BY created_at, competitor_id
            "#,
        )
        .bind(series_id)
        .fetch_all(self.pool)
        .await?;

        Ok(competitors)
    }

    /// Children of a summary series in their configured order.
    pub async fn children_of(&self, series_id: Uuid) -> Result<Vec<Series>> {
        let children = sqlx::query_as::<_, Series>(
            r#"
            SELECT s.series_id, s.name, s.slug, s.scoring_system_id, s.trend_option,
                   s.series_type, s.children_as_single_race, s.created_at
            FROM series s
            INNER JOIN series_children sc ON s.series_id = sc.child_series_id
            WHERE sc.parent_series_id = $1
            ORDER BY sc.position
            "#,
        )
        .bind(series_id)
        .fetch_all(self.pool)
        .await?;

        Ok(children)
    }

    /// Loads everything the scoring engine needs for one series,
    /// descending one level into summary children. Deeper nesting is
    /// rejected by the engine, so no recursion happens here.
    pub async fn load_series_data(&self, series_id: Uuid) -> Result<SeriesData> {
        let series = self.find_by_id(series_id).await?;
        let is_summary = series.kind() == Some(SeriesType::Summary);
        let mut data = self.load_one(series).await?;
        if is_summary {
            for child in self.children_of(series_id).await? {
                let child_data = self.load_one(child).await?;
                data.children.push(child_data);
            }
        }
        Ok(data)
    }

    async fn load_one(&self, series: Series) -> Result<SeriesData> {
        let races = self.races_for(series.series_id).await?;
        let scores = self.scores_for_series(series.series_id).await?;
        let competitors = self.competitors_for(series.series_id).await?;
        Ok(SeriesData {
            series,
            races,
            scores,
            competitors,
            children: Vec::new(),
        })
    }
}
