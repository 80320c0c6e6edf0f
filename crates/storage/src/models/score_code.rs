use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A named, rule-driven alternative to a numeric finishing place
/// (e.g. "DNF"), carrying a formula for its effective point value.
///
/// `formula` holds one of the fixed formula names (`COD`, `FIN+`, `SER+`,
/// `CTS+`, `AVE`, `AVE P`, `AVE ND`, `PLC%`, `MAN`, `TIE`); the engine
/// converts it to a typed variant when the rule set is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScoreCode {
    pub code_id: Uuid,
    pub system_id: Uuid,
    pub name: String,
    pub formula: String,
    pub formula_value: Option<i32>,
    /// Name of another code this one scores like. Only used by `COD`.
    pub score_like: Option<String>,
    pub discardable: bool,
    pub came_to_start: bool,
    pub started: bool,
    pub finished: bool,
    /// Keep the literal finish place rather than recompute.
    pub preserve_result: bool,
    /// Competitors finishing behind still count this boat as a finisher
    /// ahead of them.
    pub adjust_other_scores: bool,
    pub count_as_participation: bool,
}
