//! The series scoring engine.
//!
//! Computed synchronously and side-effect-free: standings are a pure
//! function of the series, its races' scores, and the resolved scoring
//! system, so independent series can be recomputed in parallel with no
//! locking. Races within one series are a hard sequential dependency
//! (cross-race formulas read earlier races) and are evaluated in one
//! ordered pass.

mod discards;
mod evaluator;
mod ranking;
mod rule_set;
mod summary;
mod what_if;

#[cfg(test)]
pub(crate) mod test_support;

pub use discards::DiscardSchedule;
pub use rule_set::{Formula, ResolvedCode, RuleSet, ScoringSystemGraph, resolve_rule_set};
pub use what_if::{WhatIfOverrides, run as run_what_if};

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::models::{
    Competitor, CompetitorStanding, Race, RaceScore, Score, ScoredRace, Series, SeriesResults,
    SeriesType, TrendOption,
};

use evaluator::RaceEntry;
use ranking::RankedRow;

/// Everything the engine needs to score one series: the series row, its
/// races and scores, the competitors (creation order is the final ranking
/// tie-break), and, for summary series, the fully loaded children.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub series: Series,
    pub races: Vec<Race>,
    pub scores: Vec<Score>,
    pub competitors: Vec<Competitor>,
    pub children: Vec<SeriesData>,
}

/// A resolved scoring configuration. What-if runs build a private copy,
/// so nothing here is shared mutable state.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub scoring_system_id: Uuid,
    pub rules: RuleSet,
    pub discards: DiscardSchedule,
    pub participation_percent: Option<Decimal>,
}

impl ScoringConfig {
    /// Resolves the effective configuration for a scoring system,
    /// validating the discard pattern and participation fraction eagerly
    /// so a bad rule set never produces partial standings.
    pub fn from_graph(system_id: Uuid, graph: &ScoringSystemGraph) -> ScoringResult<Self> {
        let rules = resolve_rule_set(system_id, graph)?;
        let system = graph.system(system_id).ok_or_else(|| {
            ScoringError::Configuration(format!("scoring system {system_id} does not exist"))
        })?;
        let discards = DiscardSchedule::parse(&system.discard_pattern)?;
        let participation_percent = validate_fraction(system.participation_percent)?;
        Ok(Self {
            scoring_system_id: system_id,
            rules,
            discards,
            participation_percent,
        })
    }
}

pub(crate) fn validate_fraction(fraction: Option<Decimal>) -> ScoringResult<Option<Decimal>> {
    if let Some(f) = fraction {
        if f < Decimal::ZERO || f > Decimal::ONE {
            return Err(ScoringError::Configuration(format!(
                "participation fraction {f} must be between 0 and 1"
            )));
        }
    }
    Ok(fraction)
}

/// Scores a series end to end: rule resolution has already happened in
/// `config`; this runs formula evaluation, discard selection, ranking
/// and trend, and for summary series aggregates the children first.
///
/// `graph` supplies the scoring systems of summary children, which are
/// scored under their own configurations.
pub fn compute_series_results(
    data: &SeriesData,
    config: &ScoringConfig,
    graph: &ScoringSystemGraph,
) -> ScoringResult<SeriesResults> {
    let kind = data.series.kind().ok_or_else(|| {
        ScoringError::Configuration(format!(
            "series {} has unknown type '{}'",
            data.series.series_id, data.series.series_type
        ))
    })?;

    let entries = match kind {
        SeriesType::Summary => summary::assemble_entries(data, config, graph)?,
        SeriesType::Standard | SeriesType::Regatta => own_entries(data),
    };

    let creation_order = creation_index(data);
    let rows = standings_for(&entries, config, &creation_order)?;

    // Trend compares against the standings just before the final race.
    let previous_ranks = if data.series.trend() == TrendOption::PreviousRace && entries.len() >= 2
    {
        let previous = standings_for(&entries[..entries.len() - 1], config, &creation_order)?;
        Some(
            previous
                .into_iter()
                .map(|row| (row.competitor_id, row.rank))
                .collect::<HashMap<Uuid, u32>>(),
        )
    } else {
        None
    };

    let races = entries
        .iter()
        .map(|e| ScoredRace {
            race_id: e.race_id,
            name: e.name.clone(),
            date: e.date,
            order_key: e.order_key,
        })
        .collect();

    let standings = rows
        .into_iter()
        .map(|row| {
            let trend = previous_ranks.as_ref().and_then(|previous| {
                previous
                    .get(&row.competitor_id)
                    .map(|prev| *prev as i32 - row.rank as i32)
            });
            let scores = row
                .cells
                .iter()
                .map(|c| RaceScore {
                    race_id: c.race_id,
                    place: c.place,
                    code: c.code.clone(),
                    points: c.points,
                    discarded: c.discarded,
                })
                .collect();
            CompetitorStanding {
                competitor_id: row.competitor_id,
                total: row.total,
                rank: row.rank,
                trend,
                scores,
            }
        })
        .collect();

    Ok(SeriesResults {
        series_id: data.series.series_id,
        scoring_system_id: config.scoring_system_id,
        races_completed: entries.len() as u32,
        races,
        standings,
    })
}

/// Evaluate, discard provisionally, refine averages with whole-series
/// knowledge, re-select discards on the refined values, then rank.
fn standings_for(
    entries: &[RaceEntry],
    config: &ScoringConfig,
    creation_order: &HashMap<Uuid, (NaiveDateTime, Uuid)>,
) -> ScoringResult<Vec<RankedRow>> {
    let mut cells = evaluator::score_races(entries, &config.rules)?;
    let races_completed = entries.len();

    for competitor_cells in cells.values_mut() {
        discards::select_discards(
            competitor_cells,
            races_completed,
            &config.discards,
            config.participation_percent,
        );
    }
    evaluator::refine_averages(&mut cells);
    for competitor_cells in cells.values_mut() {
        discards::select_discards(
            competitor_cells,
            races_completed,
            &config.discards,
            config.participation_percent,
        );
    }

    Ok(ranking::rank_competitors(cells, creation_order))
}

/// The series' own raced races, oldest first (date, then order key),
/// each with its scores attached.
fn own_entries(data: &SeriesData) -> Vec<RaceEntry> {
    let mut scores_by_race: HashMap<Uuid, Vec<Score>> = HashMap::new();
    for score in &data.scores {
        scores_by_race
            .entry(score.race_id)
            .or_default()
            .push(score.clone());
    }

    let mut races: Vec<&Race> = data.races.iter().filter(|r| r.is_raced()).collect();
    races.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.order_key.cmp(&b.order_key))
            .then(a.created_at.cmp(&b.created_at))
            .then(a.race_id.cmp(&b.race_id))
    });

    races
        .into_iter()
        .map(|race| RaceEntry {
            race_id: race.race_id,
            name: race.name.clone(),
            date: race.date,
            order_key: race.order_key,
            scores: scores_by_race.remove(&race.race_id).unwrap_or_default(),
        })
        .collect()
}

fn creation_index(data: &SeriesData) -> HashMap<Uuid, (NaiveDateTime, Uuid)> {
    let mut index = HashMap::new();
    collect_creation(data, &mut index);
    index
}

fn collect_creation(data: &SeriesData, index: &mut HashMap<Uuid, (NaiveDateTime, Uuid)>) {
    for competitor in &data.competitors {
        index
            .entry(competitor.competitor_id)
            .or_insert((competitor.created_at, competitor.competitor_id));
    }
    for child in &data.children {
        collect_creation(child, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::test_support::{
        competitor, dec, race, race_score, series, system,
    };

    fn graph_with(pattern: &str) -> (ScoringSystemGraph, Uuid) {
        let mut sys = system("Club", None);
        sys.discard_pattern = pattern.to_string();
        let id = sys.system_id;
        let mut graph = ScoringSystemGraph::default();
        graph.insert_system(sys, vec![]);
        (graph, id)
    }

    /// The worked example: discard pattern "0,1", competitor A places
    /// 1, 2, 5 over three races; the 5 is discarded and A totals 3.
    #[test]
    fn test_three_race_series_with_discard_and_trend() {
        let (graph, system_id) = graph_with("0,1");
        let config = ScoringConfig::from_graph(system_id, &graph).unwrap();

        let mut s = series(system_id, "standard");
        s.trend_option = "previous_race".to_string();
        let races = vec![
            race(s.series_id, 0, "raced"),
            race(s.series_id, 1, "raced"),
            race(s.series_id, 2, "raced"),
            race(s.series_id, 3, "scheduled"),
        ];
        let a = competitor("Alice", 0);
        let b = competitor("Bob", 1);

        let scores = vec![
            race_score(&races[0], &a, Some(1), None),
            race_score(&races[0], &b, Some(3), None),
            race_score(&races[1], &a, Some(2), None),
            race_score(&races[1], &b, Some(1), None),
            race_score(&races[2], &a, Some(5), None),
            race_score(&races[2], &b, Some(1), None),
        ];

        let data = SeriesData {
            series: s,
            races,
            scores,
            competitors: vec![a.clone(), b.clone()],
            children: vec![],
        };
        let results = compute_series_results(&data, &config, &graph).unwrap();

        assert_eq!(results.races_completed, 3);
        assert_eq!(results.races.len(), 3);

        let alice = results
            .standings
            .iter()
            .find(|st| st.competitor_id == a.competitor_id)
            .unwrap();
        assert_eq!(alice.total, dec("3"));
        assert!(alice.scores[2].discarded);
        assert_eq!(alice.scores[2].points, dec("5"));

        let bob = results
            .standings
            .iter()
            .find(|st| st.competitor_id == b.competitor_id)
            .unwrap();
        // Bob: 3, 1, 1 → the 3 is discarded, total 2, rank 1.
        assert_eq!(bob.total, dec("2"));
        assert_eq!(bob.rank, 1);
        assert_eq!(alice.rank, 2);

        // After race 2 Alice led (countback on 1,2 vs 1,3); race 3
        // reversed it.
        assert_eq!(alice.trend, Some(-1));
        assert_eq!(bob.trend, Some(1));
    }

    #[test]
    fn test_trend_omitted_when_option_off() {
        let (graph, system_id) = graph_with("0,1");
        let config = ScoringConfig::from_graph(system_id, &graph).unwrap();

        let s = series(system_id, "standard");
        let races = vec![race(s.series_id, 0, "raced"), race(s.series_id, 1, "raced")];
        let a = competitor("Alice", 0);
        let scores = vec![
            race_score(&races[0], &a, Some(1), None),
            race_score(&races[1], &a, Some(1), None),
        ];
        let data = SeriesData {
            series: s,
            races,
            scores,
            competitors: vec![a],
            children: vec![],
        };
        let results = compute_series_results(&data, &config, &graph).unwrap();
        assert!(results.standings[0].trend.is_none());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (graph, system_id) = graph_with("0,1,1");
        let config = ScoringConfig::from_graph(system_id, &graph).unwrap();

        let s = series(system_id, "standard");
        let races = vec![
            race(s.series_id, 0, "raced"),
            race(s.series_id, 1, "raced"),
            race(s.series_id, 2, "raced"),
        ];
        let a = competitor("Alice", 0);
        let b = competitor("Bob", 1);
        let scores = vec![
            race_score(&races[0], &a, Some(1), None),
            race_score(&races[0], &b, Some(2), None),
            race_score(&races[1], &a, Some(4), None),
            race_score(&races[1], &b, Some(1), None),
            race_score(&races[2], &a, Some(2), None),
            race_score(&races[2], &b, Some(3), None),
        ];
        let data = SeriesData {
            series: s,
            races,
            scores,
            competitors: vec![a, b],
            children: vec![],
        };

        let first = compute_series_results(&data, &config, &graph).unwrap();
        let second = compute_series_results(&data, &config, &graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_series_type_is_configuration_error() {
        let (graph, system_id) = graph_with("");
        let config = ScoringConfig::from_graph(system_id, &graph).unwrap();
        let s = series(system_id, "knockout");
        let data = SeriesData {
            series: s,
            races: vec![],
            scores: vec![],
            competitors: vec![],
            children: vec![],
        };
        assert!(matches!(
            compute_series_results(&data, &config, &graph),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_participation_fraction_out_of_range_rejected() {
        let mut sys = system("Club", None);
        sys.participation_percent = Some(dec("1.5"));
        let id = sys.system_id;
        let mut graph = ScoringSystemGraph::default();
        graph.insert_system(sys, vec![]);
        assert!(matches!(
            ScoringConfig::from_graph(id, &graph),
            Err(ScoringError::Configuration(_))
        ));
    }
}
