use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::services::scoring::WhatIfOverrides;

/// Overrides for a speculative recomputation. Absent fields keep the
/// series' live configuration.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct WhatIfRequest {
    pub scoring_system_id: Option<Uuid>,
    #[validate(range(max = 50))]
    pub discard_count: Option<u32>,
    pub participation_percent: Option<Decimal>,
}

impl WhatIfRequest {
    /// Range check the derive cannot express: the participation override
    /// is a fraction of completed races.
    pub fn check_participation(&self) -> Result<(), String> {
        if let Some(fraction) = self.participation_percent
            && (fraction < Decimal::ZERO || fraction > Decimal::ONE)
        {
            return Err("participation_percent must be between 0 and 1".to_string());
        }
        Ok(())
    }

    pub fn into_overrides(self) -> WhatIfOverrides {
        WhatIfOverrides {
            scoring_system_id: self.scoring_system_id,
            discard_count: self.discard_count,
            participation_percent: self.participation_percent,
        }
    }
}
