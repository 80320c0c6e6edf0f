use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Race {
    pub race_id: Uuid,
    pub series_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    /// Tie-break ordering for races sailed on the same date.
    pub order_key: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl Race {
    pub fn race_status(&self) -> RaceStatus {
        RaceStatus::parse(&self.status)
    }

    /// Only raced races participate in scoring; scheduled and abandoned
    /// ones are display-only placeholders.
    pub fn is_raced(&self) -> bool {
        self.race_status() == RaceStatus::Raced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    Scheduled,
    Raced,
    Abandoned,
}

impl RaceStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "raced" => Self::Raced,
            "abandoned" => Self::Abandoned,
            _ => Self::Scheduled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Raced => "raced",
            Self::Abandoned => "abandoned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [RaceStatus::Scheduled, RaceStatus::Raced, RaceStatus::Abandoned] {
            assert_eq!(RaceStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_status_is_scheduled() {
        assert_eq!(RaceStatus::parse("postponed"), RaceStatus::Scheduled);
    }
}
