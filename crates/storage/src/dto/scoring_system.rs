use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ScoringSystem;
use crate::services::scoring::{Formula, ResolvedCode};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoringSystemResponse {
    pub system_id: Uuid,
    pub name: String,
    pub discard_pattern: String,
    pub participation_percent: Option<Decimal>,
    pub parent_system_id: Option<Uuid>,
}

impl From<&ScoringSystem> for ScoringSystemResponse {
    fn from(system: &ScoringSystem) -> Self {
        Self {
            system_id: system.system_id,
            name: system.name.clone(),
            discard_pattern: system.discard_pattern.clone(),
            participation_percent: system.participation_percent,
            parent_system_id: system.parent_system_id,
        }
    }
}

/// One code of a system's effective rule set, after inheritance merging.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EffectiveCodeResponse {
    pub name: String,
    pub formula: String,
    pub formula_value: Option<i32>,
    pub score_like: Option<String>,
    pub discardable: bool,
    pub came_to_start: bool,
    pub started: bool,
    pub finished: bool,
    pub preserve_result: bool,
    pub adjust_other_scores: bool,
    pub count_as_participation: bool,
}

impl From<&ResolvedCode> for EffectiveCodeResponse {
    fn from(code: &ResolvedCode) -> Self {
        let (formula_value, score_like) = match &code.formula {
            Formula::ScoreLike { target } => (None, Some(target.clone())),
            Formula::FinishersPlus { value }
            | Formula::SeriesEntrantsPlus { value }
            | Formula::CameToStartPlus { value }
            | Formula::PlacePercent { value } => (Some(*value), None),
            Formula::Average
            | Formula::AverageOfPrevious
            | Formula::AverageNoDiscard
            | Formula::Manual
            | Formula::TieWithNextBetter => (None, None),
        };
        Self {
            name: code.name.clone(),
            formula: code.formula.as_str().to_string(),
            formula_value,
            score_like,
            discardable: code.discardable,
            came_to_start: code.came_to_start,
            started: code.started,
            finished: code.finished,
            preserve_result: code.preserve_result,
            adjust_other_scores: code.adjust_other_scores,
            count_as_participation: code.count_as_participation,
        }
    }
}
