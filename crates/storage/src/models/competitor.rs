use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The engine treats competitor identity as an opaque key; `created_at`
/// (then `competitor_id`) is the deterministic last-resort tie-break.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competitor {
    pub competitor_id: Uuid,
    pub name: String,
    pub sail_number: String,
    pub boat_class: Option<String>,
    pub created_at: NaiveDateTime,
}
