//! Builders shared by the scoring engine's unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Competitor, Race, Score, ScoreCode, ScoringSystem, Series};

use super::evaluator::{Cell, RaceEntry};
use super::rule_set::{RuleSet, ScoringSystemGraph, resolve_rule_set};

pub(crate) fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub(crate) fn race_day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap() + chrono::Duration::days(offset as i64)
}

pub(crate) fn system(name: &str, parent: Option<Uuid>) -> ScoringSystem {
    ScoringSystem {
        system_id: Uuid::new_v4(),
        name: name.to_string(),
        discard_pattern: String::new(),
        participation_percent: None,
        parent_system_id: parent,
        created_at: base_time(),
    }
}

pub(crate) fn code(
    system_id: Uuid,
    name: &str,
    formula: &str,
    formula_value: Option<i32>,
    score_like: Option<&str>,
) -> ScoreCode {
    ScoreCode {
        code_id: Uuid::new_v4(),
        system_id,
        name: name.to_string(),
        formula: formula.to_string(),
        formula_value,
        score_like: score_like.map(str::to_string),
        discardable: true,
        came_to_start: false,
        started: false,
        finished: false,
        preserve_result: false,
        adjust_other_scores: false,
        count_as_participation: false,
    }
}

/// Resolves a one-system rule set from the given codes.
pub(crate) fn ruleset(codes: Vec<ScoreCode>) -> RuleSet {
    let mut graph = ScoringSystemGraph::default();
    let sys = system("Test", None);
    let id = sys.system_id;
    let codes = codes
        .into_iter()
        .map(|mut c| {
            c.system_id = id;
            c
        })
        .collect();
    graph.insert_system(sys, codes);
    resolve_rule_set(id, &graph).unwrap()
}

pub(crate) fn score(competitor_id: Uuid, place: Option<i32>, code: Option<&str>) -> Score {
    Score {
        score_id: Uuid::new_v4(),
        race_id: Uuid::nil(),
        competitor_id,
        place,
        code: code.map(str::to_string),
        code_points: None,
    }
}

/// A raced pseudo-race on day `offset`, order key 0.
pub(crate) fn entry(offset: usize, scores: Vec<Score>) -> RaceEntry {
    RaceEntry {
        race_id: Uuid::new_v4(),
        name: None,
        date: race_day(offset),
        order_key: 0,
        scores,
    }
}

pub(crate) fn cell(race_index: usize, points: &str, discarded: bool) -> Cell {
    Cell {
        race_index,
        race_id: Uuid::new_v4(),
        competitor_id: Uuid::new_v4(),
        place: None,
        code: None,
        points: dec(points),
        discarded,
        discardable: true,
        counts_for_participation: true,
        average: None,
        race_date: race_day(race_index),
        race_order: 0,
        entrants: 4,
    }
}

pub(crate) fn race(series_id: Uuid, offset: usize, status: &str) -> Race {
    Race {
        race_id: Uuid::new_v4(),
        series_id,
        name: Some(format!("Race {}", offset + 1)),
        date: race_day(offset),
        order_key: 0,
        status: status.to_string(),
        created_at: base_time(),
    }
}

pub(crate) fn competitor(name: &str, seq: i64) -> Competitor {
    Competitor {
        competitor_id: Uuid::new_v4(),
        name: name.to_string(),
        sail_number: format!("GBR{seq}"),
        boat_class: None,
        created_at: base_time() + chrono::Duration::seconds(seq),
    }
}

pub(crate) fn series(scoring_system_id: Uuid, series_type: &str) -> Series {
    Series {
        series_id: Uuid::new_v4(),
        name: "Test Series".to_string(),
        slug: "test-series".to_string(),
        scoring_system_id,
        trend_option: "none".to_string(),
        series_type: series_type.to_string(),
        children_as_single_race: false,
        created_at: base_time(),
    }
}

/// A race-scoped score attached to a concrete race id.
pub(crate) fn race_score(
    race: &Race,
    competitor: &Competitor,
    place: Option<i32>,
    code: Option<&str>,
) -> Score {
    Score {
        score_id: Uuid::new_v4(),
        race_id: race.race_id,
        competitor_id: competitor.competitor_id,
        place,
        code: code.map(str::to_string),
        code_points: None,
    }
}
