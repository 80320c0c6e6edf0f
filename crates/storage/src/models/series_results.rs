use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Computed standings for one series: a pure function of the series, its
/// resolved scoring system, and its races' scores. Recomputed on demand
/// and optionally cached as a versioned snapshot for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeriesResults {
    pub series_id: Uuid,
    pub scoring_system_id: Uuid,
    /// Number of raced races the standings are based on.
    pub races_completed: u32,
    pub races: Vec<ScoredRace>,
    pub standings: Vec<CompetitorStanding>,
}

/// A scored race column. For a summary series scored child-per-race the
/// id and name are the child series' own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoredRace {
    pub race_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub order_key: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompetitorStanding {
    pub competitor_id: Uuid,
    pub total: Decimal,
    /// 1-based dense rank; equal only for fully tied competitors.
    pub rank: u32,
    /// Rank delta versus the standings before the final race (positive =
    /// improved). Absent when the series trend option is off or no
    /// earlier standing exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<i32>,
    pub scores: Vec<RaceScore>,
}

/// One computed cell of the results grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RaceScore {
    pub race_id: Uuid,
    pub place: Option<i32>,
    pub code: Option<String>,
    pub points: Decimal,
    pub discarded: bool,
}

/// Persisted snapshot of a computed `SeriesResults`, versioned with an
/// `is_current` flag over prior snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResultsSnapshot {
    pub snapshot_id: Uuid,
    pub series_id: Uuid,
    pub is_current: bool,
    /// JSON-encoded `SeriesResults`.
    pub results: String,
    pub created_at: NaiveDateTime,
}

impl ResultsSnapshot {
    pub fn decode(&self) -> Result<SeriesResults, serde_json::Error> {
        serde_json::from_str(&self.results)
    }
}
