use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ScoringError, ScoringResult};

use super::evaluator::Cell;

/// Discard allowance as a function of completed race count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardSchedule {
    /// Parsed club table: entry *i* applies once *i + 1* races are
    /// completed; the last entry keeps applying beyond the table.
    Pattern(Vec<u32>),
    /// What-if override: a flat count, clamped so a competitor can never
    /// discard as many races as have been completed.
    Fixed(u32),
}

impl DiscardSchedule {
    /// Parses a comma-separated pattern such as `"0,1,2"`. Entry *i*
    /// must be strictly less than its 1-based race count (you cannot
    /// discard more races than have been sailed); anything else is a
    /// configuration error, detected eagerly.
    pub fn parse(pattern: &str) -> ScoringResult<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Ok(Self::Pattern(Vec::new()));
        }

        let mut entries = Vec::new();
        for (i, raw) in trimmed.split(',').enumerate() {
            let n: u32 = raw.trim().parse().map_err(|_| {
                ScoringError::Configuration(format!(
                    "discard pattern entry '{}' is not a non-negative integer",
                    raw.trim()
                ))
            })?;
            if n as usize > i {
                return Err(ScoringError::Configuration(format!(
                    "discard pattern entry {n} at position {} would discard more races than completed",
                    i + 1
                )));
            }
            entries.push(n);
        }
        Ok(Self::Pattern(entries))
    }

    pub fn fixed(count: u32) -> Self {
        Self::Fixed(count)
    }

    /// Discards allowed once `races_completed` races have been sailed.
    pub fn allowance(&self, races_completed: usize) -> u32 {
        if races_completed == 0 {
            return 0;
        }
        match self {
            Self::Pattern(entries) => entries
                .get(races_completed - 1)
                .or_else(|| entries.last())
                .copied()
                .unwrap_or(0),
            Self::Fixed(count) => (*count).min(races_completed as u32 - 1),
        }
    }
}

/// Marks the allowance's worst eligible scores as discarded. `cells` is
/// one competitor's computed scores; flags are reset first so the
/// selection can be re-run after average refinement.
pub(crate) fn select_discards(
    cells: &mut [Cell],
    races_completed: usize,
    schedule: &DiscardSchedule,
    participation_percent: Option<Decimal>,
) {
    for cell in cells.iter_mut() {
        cell.discarded = false;
    }

    let mut allowed = schedule.allowance(races_completed) as usize;
    if allowed == 0 {
        return;
    }

    // Participation gate: no discards until the competitor has results in
    // enough of the completed races.
    if let Some(fraction) = participation_percent {
        let required = (fraction * Decimal::from(races_completed))
            .ceil()
            .to_usize()
            .unwrap_or(usize::MAX);
        let results_in = cells.iter().filter(|c| c.counts_for_participation).count();
        if results_in < required {
            return;
        }
    }

    let mut eligible: Vec<usize> = (0..cells.len()).filter(|&i| cells[i].discardable).collect();
    // Worst points first; ties prefer the later race date, then the
    // higher order key.
    eligible.sort_by(|&a, &b| {
        let (ca, cb) = (&cells[a], &cells[b]);
        cb.points
            .cmp(&ca.points)
            .then(cb.race_date.cmp(&ca.race_date))
            .then(cb.race_order.cmp(&ca.race_order))
    });

    allowed = allowed.min(eligible.len());
    for &i in eligible.iter().take(allowed) {
        cells[i].discarded = true;
    }
}
