use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::models::Score;

use super::rule_set::{Formula, ResolvedCode, RuleSet};

/// One raced race with its scores, normalized for the pipeline. For a
/// summary series scored child-per-race these are synthetic (the race id
/// is the child series id and the places are the child's final ranks).
#[derive(Debug, Clone)]
pub(crate) struct RaceEntry {
    pub race_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub order_key: i32,
    pub scores: Vec<Score>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AverageKind {
    /// `AVE`: other non-discarded races.
    AllOthers,
    /// `AVE P`: non-discarded races before this one.
    Previous,
    /// `AVE ND`: all other races, discarded included.
    NoDiscard,
}

/// One computed cell of the results grid, carrying what the discard
/// selector and ranking need alongside the point value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cell {
    pub race_index: usize,
    pub race_id: Uuid,
    pub competitor_id: Uuid,
    pub place: Option<i32>,
    pub code: Option<String>,
    pub points: Decimal,
    pub discarded: bool,
    pub discardable: bool,
    pub counts_for_participation: bool,
    pub average: Option<AverageKind>,
    pub race_date: NaiveDate,
    pub race_order: i32,
    /// Competitors in this cell's race; the worst-possible fallback for
    /// average formulas is one more than this.
    pub entrants: usize,
}

/// Point values and averages round half-away-from-zero to one decimal.
pub(crate) fn round_points(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn mean(values: &[Decimal]) -> Decimal {
    let sum: Decimal = values.iter().copied().sum();
    round_points(sum / Decimal::from(values.len() as i64))
}

/// Evaluates every raced race oldest → newest. Within one race the
/// competitor order is free, but the race order is a hard dependency:
/// average formulas read the competitor's already-computed earlier races.
pub(crate) fn score_races(
    entries: &[RaceEntry],
    rules: &RuleSet,
) -> ScoringResult<HashMap<Uuid, Vec<Cell>>> {
    let series_entrants = {
        let mut seen = HashSet::new();
        for entry in entries {
            for score in &entry.scores {
                seen.insert(score.competitor_id);
            }
        }
        seen.len()
    };

    let mut by_competitor: HashMap<Uuid, Vec<Cell>> = HashMap::new();
    for (race_index, entry) in entries.iter().enumerate() {
        if entry.scores.is_empty() {
            return Err(ScoringError::IncompleteRaceData {
                race_id: entry.race_id,
            });
        }
        let cells = score_one_race(race_index, entry, rules, series_entrants, &by_competitor)?;
        for cell in cells {
            by_competitor.entry(cell.competitor_id).or_default().push(cell);
        }
    }
    Ok(by_competitor)
}

struct Prepared<'a> {
    score: &'a Score,
    direct: Option<&'a ResolvedCode>,
    terminal: Option<&'a ResolvedCode>,
}

impl Prepared<'_> {
    /// A score with no code is an ordinary finisher.
    fn is_finisher(&self) -> bool {
        self.direct.is_none_or(|c| c.finished)
    }

    fn came_to_start(&self) -> bool {
        self.direct.is_none_or(|c| c.came_to_start)
    }
}

fn score_one_race(
    race_index: usize,
    entry: &RaceEntry,
    rules: &RuleSet,
    series_entrants: usize,
    earlier: &HashMap<Uuid, Vec<Cell>>,
) -> ScoringResult<Vec<Cell>> {
    let prepared = entry
        .scores
        .iter()
        .map(|score| {
            let (direct, terminal) = match score.code.as_deref() {
                Some(name) => {
                    let (d, t) = rules.resolve_terminal(name)?;
                    (Some(d), Some(t))
                }
                None => (None, None),
            };
            Ok(Prepared {
                score,
                direct,
                terminal,
            })
        })
        .collect::<ScoringResult<Vec<_>>>()?;

    let entrants = prepared.len();
    let finishers = prepared.iter().filter(|p| p.is_finisher()).count();
    let starters = prepared.iter().filter(|p| p.came_to_start()).count();

    // Coded boats vacate their finishing slot unless the code keeps it;
    // an uncoded boat moves up past every vacated slot ahead of it.
    let vacated_before = |place: i32| {
        prepared
            .iter()
            .filter(|p| {
                p.direct.is_some_and(|c| !c.adjust_other_scores)
                    && p.score.place.is_some_and(|q| q < place)
            })
            .count()
    };

    let worst_fallback = Decimal::from(entrants as i64 + 1);

    // Sweep one: everything that does not read other values in this race.
    let mut values: Vec<Option<Decimal>> = vec![None; entrants];
    let mut averages: Vec<Option<AverageKind>> = vec![None; entrants];
    let mut plc_pending: Vec<(usize, i32)> = Vec::new();
    let mut tie_pending: Vec<(usize, i32)> = Vec::new();

    for (i, p) in prepared.iter().enumerate() {
        let (direct, terminal) = match (p.direct, p.terminal) {
            (Some(d), Some(t)) => (d, t),
            _ => {
                let place = require_place(p.score, "a score with no code")?;
                values[i] = Some(Decimal::from(
                    place as i64 - vacated_before(place) as i64,
                ));
                continue;
            }
        };

        if direct.preserve_result && p.score.place.is_some() {
            // Keep the literal finish place rather than recompute.
            values[i] = p.score.place.map(Decimal::from);
            continue;
        }

        match &terminal.formula {
            Formula::Manual => {
                let points =
                    p.score
                        .code_points
                        .ok_or_else(|| ScoringError::MissingManualScore {
                            code: direct.name.clone(),
                            competitor_id: p.score.competitor_id,
                        })?;
                values[i] = Some(points);
            }
            Formula::FinishersPlus { value } => {
                values[i] = Some(Decimal::from(finishers as i64 + *value as i64));
            }
            Formula::CameToStartPlus { value } => {
                values[i] = Some(Decimal::from(starters as i64 + *value as i64));
            }
            Formula::SeriesEntrantsPlus { value } => {
                values[i] = Some(Decimal::from(series_entrants as i64 + *value as i64));
            }
            Formula::Average | Formula::AverageOfPrevious | Formula::AverageNoDiscard => {
                // Forward-pass provisional: only earlier races are
                // computed yet; refined with whole-series knowledge after
                // the provisional discard pass.
                averages[i] = Some(match terminal.formula {
                    Formula::Average => AverageKind::AllOthers,
                    Formula::AverageOfPrevious => AverageKind::Previous,
                    _ => AverageKind::NoDiscard,
                });
                let prior: Vec<Decimal> = earlier
                    .get(&p.score.competitor_id)
                    .map(|cells| cells.iter().map(|c| c.points).collect())
                    .unwrap_or_default();
                values[i] = Some(if prior.is_empty() {
                    worst_fallback
                } else {
                    mean(&prior)
                });
            }
            Formula::PlacePercent { value } => {
                plc_pending.push((i, *value));
            }
            Formula::TieWithNextBetter => {
                let place = require_place(p.score, "a TIE code")?;
                tie_pending.push((i, place));
            }
            Formula::ScoreLike { target } => {
                // resolve_terminal never returns a COD as terminal.
                return Err(ScoringError::UnresolvedCodeReference(target.clone()));
            }
        }
    }

    // Sweep two: formulas that read this race's other values.
    let worst_finisher = prepared
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_finisher())
        .filter_map(|(i, _)| values[i])
        .max()
        .unwrap_or(Decimal::ZERO);

    for (i, percent) in plc_pending {
        let place = require_place(prepared[i].score, "a PLC% code")?;
        let uplift = Decimal::from(percent) / Decimal::from(100) * worst_finisher;
        values[i] = Some(round_points(Decimal::from(place) + uplift));
    }

    // Ascending place order so a TIE chained behind another TIE sees it.
    tie_pending.sort_by_key(|&(_, place)| place);
    for (i, place) in tie_pending {
        let pivot = Decimal::from(place);
        let next_better = values
            .iter()
            .flatten()
            .filter(|v| **v < pivot)
            .max()
            .copied();
        values[i] = Some(next_better.unwrap_or(Decimal::ONE));
    }

    prepared
        .iter()
        .zip(values)
        .zip(averages)
        .map(|((p, value), average)| {
            let points = value.ok_or_else(|| {
                ScoringError::Configuration(format!(
                    "score for competitor {} in race {} was never evaluated",
                    p.score.competitor_id, entry.race_id
                ))
            })?;
            Ok(Cell {
                race_index,
                race_id: entry.race_id,
                competitor_id: p.score.competitor_id,
                place: p.score.place,
                code: p.direct.map(|c| c.name.clone()),
                points,
                discarded: false,
                discardable: p.direct.is_none_or(|c| c.discardable),
                counts_for_participation: p
                    .direct
                    .is_none_or(|c| c.came_to_start || c.count_as_participation),
                average,
                race_date: entry.date,
                race_order: entry.order_key,
                entrants,
            })
        })
        .collect()
}

fn require_place(score: &Score, what: &str) -> ScoringResult<i32> {
    score.place.ok_or_else(|| {
        ScoringError::Configuration(format!(
            "{what} requires a recorded place (competitor {})",
            score.competitor_id
        ))
    })
}

/// Recomputes average-coded cells with whole-series knowledge once a
/// provisional discard pass has run. Averages never include other
/// average-coded cells, so this is a single deterministic pass.
pub(crate) fn refine_averages(by_competitor: &mut HashMap<Uuid, Vec<Cell>>) {
    for cells in by_competitor.values_mut() {
        let basis: Vec<(usize, Decimal, bool)> = cells
            .iter()
            .filter(|c| c.average.is_none())
            .map(|c| (c.race_index, c.points, c.discarded))
            .collect();

        for cell in cells.iter_mut() {
            let Some(kind) = cell.average else { continue };
            let values: Vec<Decimal> = basis
                .iter()
                .filter(|(race_index, _, discarded)| {
                    *race_index != cell.race_index
                        && match kind {
                            AverageKind::AllOthers => !discarded,
                            AverageKind::Previous => {
                                !discarded && *race_index < cell.race_index
                            }
                            AverageKind::NoDiscard => true,
                        }
                })
                .map(|(_, points, _)| *points)
                .collect();
            cell.points = if values.is_empty() {
                Decimal::from(cell.entrants as i64 + 1)
            } else {
                mean(&values)
            };
        }
    }
}
