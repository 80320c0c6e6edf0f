use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Series {
    pub series_id: Uuid,
    pub name: String,
    pub slug: String,
    pub scoring_system_id: Uuid,
    pub trend_option: String,
    pub series_type: String,
    /// For summary series: score each child as one pseudo-race of final
    /// ranks instead of flattening the children's individual races.
    pub children_as_single_race: bool,
    pub created_at: NaiveDateTime,
}

impl Series {
    /// `None` when the stored type is not one of the known kinds.
    pub fn kind(&self) -> Option<SeriesType> {
        SeriesType::parse(&self.series_type)
    }

    pub fn trend(&self) -> TrendOption {
        TrendOption::parse(&self.trend_option)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Standard,
    Summary,
    Regatta,
}

impl SeriesType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(Self::Standard),
            "summary" => Some(Self::Summary),
            "regatta" => Some(Self::Regatta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Summary => "summary",
            Self::Regatta => "regatta",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendOption {
    #[default]
    None,
    PreviousRace,
}

impl TrendOption {
    pub fn parse(s: &str) -> Self {
        match s {
            "previous_race" => Self::PreviousRace,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PreviousRace => "previous_race",
        }
    }
}
