use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One competitor's result in one race: a finish place, a score code,
/// or both. When a code is present it governs point computation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub score_id: Uuid,
    pub race_id: Uuid,
    pub competitor_id: Uuid,
    pub place: Option<i32>,
    pub code: Option<String>,
    /// Manual override, used only when the resolved code's formula is `MAN`.
    pub code_points: Option<Decimal>,
}
