use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standings of one series as served by the API: the computed results
/// joined with competitor identity for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeriesResultsResponse {
    pub series: SeriesInfo,
    pub races_completed: u32,
    pub races: Vec<RaceColumn>,
    pub standings: Vec<StandingRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeriesInfo {
    pub series_id: Uuid,
    pub name: String,
    pub slug: String,
    pub series_type: String,
    /// The system the standings were computed under (a what-if run may
    /// differ from the series' configured system).
    pub scoring_system_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceColumn {
    pub race_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub order_key: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StandingRow {
    pub rank: u32,
    pub competitor: CompetitorInfo,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<i32>,
    pub scores: Vec<ScoreCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitorInfo {
    pub competitor_id: Uuid,
    pub name: String,
    pub sail_number: String,
    pub boat_class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreCell {
    pub race_id: Uuid,
    pub place: Option<i32>,
    pub code: Option<String>,
    pub points: Decimal,
    pub discarded: bool,
}
