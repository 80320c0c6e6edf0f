use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Series;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeriesResponse {
    pub series_id: Uuid,
    pub name: String,
    pub slug: String,
    pub series_type: String,
    pub trend_option: String,
    pub scoring_system_id: Uuid,
    pub children_as_single_race: bool,
    pub created_at: NaiveDateTime,
}

impl From<&Series> for SeriesResponse {
    fn from(series: &Series) -> Self {
        Self {
            series_id: series.series_id,
            name: series.name.clone(),
            slug: series.slug.clone(),
            series_type: series.series_type.clone(),
            trend_option: series.trend_option.clone(),
            scoring_system_id: series.scoring_system_id,
            children_as_single_race: series.children_as_single_race,
            created_at: series.created_at,
        }
    }
}
