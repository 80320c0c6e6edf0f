use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A club-configurable scoring rule set.
///
/// `discard_pattern` is a comma-separated list of allowances: entry *i*
/// (0-based) is the number of discards granted once the series has
/// completed *i + 1* races. `parent_system_id` forms an inheritance
/// chain; codes defined closer to the leaf shadow ancestor codes of the
/// same name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScoringSystem {
    pub system_id: Uuid,
    pub name: String,
    pub discard_pattern: String,
    /// Minimum fraction of completed races a competitor must have a
    /// result in before any discard is granted (0..=1), if set.
    pub participation_percent: Option<Decimal>,
    pub parent_system_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}
