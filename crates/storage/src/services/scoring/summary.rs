use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::models::{Score, SeriesType};

use super::evaluator::RaceEntry;
use super::rule_set::ScoringSystemGraph;
use super::{ScoringConfig, SeriesData, compute_series_results, own_entries};

/// Code conventionally given to competitors absent from a child series
/// when a summary is scored child-per-race.
const NON_PARTICIPATION_CODE: &str = "DNC";

/// Builds the race list a summary series is scored over. Children are
/// scored under their own scoring systems; nesting another summary is a
/// configuration error, enforced as validation rather than a recursion
/// limit.
pub(crate) fn assemble_entries(
    data: &SeriesData,
    config: &ScoringConfig,
    graph: &ScoringSystemGraph,
) -> ScoringResult<Vec<RaceEntry>> {
    for child in &data.children {
        match child.series.kind() {
            Some(SeriesType::Summary) => {
                return Err(ScoringError::Configuration(format!(
                    "summary series {} may not contain summary series {}",
                    data.series.series_id, child.series.series_id
                )));
            }
            Some(_) => {}
            None => {
                return Err(ScoringError::Configuration(format!(
                    "series {} has unknown type '{}'",
                    child.series.series_id, child.series.series_type
                )));
            }
        }
    }

    if data.series.children_as_single_race {
        child_standings_as_races(data, config, graph)
    } else {
        flattened_child_races(data)
    }
}

/// One pseudo-race per child: the "place" is the child's final rank.
fn child_standings_as_races(
    data: &SeriesData,
    config: &ScoringConfig,
    graph: &ScoringSystemGraph,
) -> ScoringResult<Vec<RaceEntry>> {
    let mut child_results = Vec::with_capacity(data.children.len());
    for child in &data.children {
        let child_config = ScoringConfig::from_graph(child.series.scoring_system_id, graph)?;
        child_results.push(compute_series_results(child, &child_config, graph)?);
    }

    // Competitor universe in first-appearance order, for DNC backfill.
    let mut universe: Vec<Uuid> = Vec::new();
    let mut seen = HashSet::new();
    for results in &child_results {
        for standing in &results.standings {
            if seen.insert(standing.competitor_id) {
                universe.push(standing.competitor_id);
            }
        }
    }

    let score_absences = config.rules.get(NON_PARTICIPATION_CODE).is_some();

    let mut entries = Vec::new();
    for (position, (child, results)) in data.children.iter().zip(&child_results).enumerate() {
        // A child with nothing raced yet contributes no column.
        let Some(date) = results.races.iter().map(|r| r.date).max() else {
            continue;
        };

        let mut scores: Vec<Score> = results
            .standings
            .iter()
            .map(|standing| Score {
                score_id: Uuid::nil(),
                race_id: child.series.series_id,
                competitor_id: standing.competitor_id,
                place: Some(standing.rank as i32),
                code: None,
                code_points: None,
            })
            .collect();

        if score_absences {
            let present: HashSet<Uuid> = results
                .standings
                .iter()
                .map(|s| s.competitor_id)
                .collect();
            for competitor_id in &universe {
                if !present.contains(competitor_id) {
                    scores.push(Score {
                        score_id: Uuid::nil(),
                        race_id: child.series.series_id,
                        competitor_id: *competitor_id,
                        place: None,
                        code: Some(NON_PARTICIPATION_CODE.to_string()),
                        code_points: None,
                    });
                }
            }
        }

        entries.push(RaceEntry {
            race_id: child.series.series_id,
            name: Some(child.series.name.clone()),
            date,
            order_key: position as i32,
            scores,
        });
    }
    Ok(entries)
}

/// All children's individual raced races combined into one list, each
/// keeping its own date and order key.
fn flattened_child_races(data: &SeriesData) -> ScoringResult<Vec<RaceEntry>> {
    let mut entries: Vec<RaceEntry> = Vec::new();
    for child in &data.children {
        entries.extend(own_entries(child));
    }
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.order_key.cmp(&b.order_key))
            .then(a.race_id.cmp(&b.race_id))
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::test_support::{
        code, competitor, dec, race, race_score, series, system,
    };
    use crate::services::scoring::{ScoringConfig, ScoringSystemGraph};
    use crate::models::Competitor;

    struct Fixture {
        graph: ScoringSystemGraph,
        summary_config: ScoringConfig,
        summary: SeriesData,
    }

    /// Two two-race children sharing three competitors; Carol skips the
    /// second child series entirely.
    fn fixture(children_as_single_race: bool, with_dnc: bool) -> Fixture {
        let mut graph = ScoringSystemGraph::default();

        let child_sys = system("Club", None);
        let child_sys_id = child_sys.system_id;
        graph.insert_system(child_sys, vec![]);

        let summary_sys = system("Overall", None);
        let summary_sys_id = summary_sys.system_id;
        let codes = if with_dnc {
            vec![code(summary_sys_id, "DNC", "SER+", Some(1), None)]
        } else {
            vec![]
        };
        graph.insert_system(summary_sys, codes);

        let alice = competitor("Alice", 0);
        let bob = competitor("Bob", 1);
        let carol = competitor("Carol", 2);

        let build_child = |name: &str, offset: usize, entrants: &[(&Competitor, [i32; 2])]| {
            let mut child = series(child_sys_id, "standard");
            child.name = name.to_string();
            let races = vec![
                race(child.series_id, offset, "raced"),
                race(child.series_id, offset + 1, "raced"),
            ];
            let mut scores = Vec::new();
            for (comp, places) in entrants {
                scores.push(race_score(&races[0], comp, Some(places[0]), None));
                scores.push(race_score(&races[1], comp, Some(places[1]), None));
            }
            SeriesData {
                series: child,
                races,
                scores,
                competitors: entrants.iter().map(|(c, _)| (*c).clone()).collect(),
                children: vec![],
            }
        };

        let spring = build_child(
            "Spring Cup",
            0,
            &[(&alice, [1, 1]), (&bob, [2, 2]), (&carol, [3, 3])],
        );
        let autumn = build_child("Autumn Cup", 10, &[(&alice, [1, 1]), (&bob, [2, 2])]);

        let mut summary = series(summary_sys_id, "summary");
        summary.children_as_single_race = children_as_single_race;
        let summary = SeriesData {
            series: summary,
            races: vec![],
            scores: vec![],
            competitors: vec![alice, bob, carol],
            children: vec![spring, autumn],
        };

        let summary_config = ScoringConfig::from_graph(summary_sys_id, &graph).unwrap();
        Fixture {
            graph,
            summary_config,
            summary,
        }
    }

    #[test]
    fn test_children_as_single_races_score_final_ranks() {
        let f = fixture(true, true);
        let results =
            compute_series_results(&f.summary, &f.summary_config, &f.graph).unwrap();

        assert_eq!(results.races_completed, 2);
        assert_eq!(results.races[0].name.as_deref(), Some("Spring Cup"));

        let alice = &results.standings[0];
        // Alice won both children, so her pseudo-places are 1 and 1.
        assert_eq!(alice.total, dec("2"));
        assert_eq!(alice.rank, 1);
        assert_eq!(alice.scores[0].place, Some(1));
        assert_eq!(alice.scores[1].place, Some(1));
    }

    #[test]
    fn test_absent_competitor_gets_non_participation_code() {
        let f = fixture(true, true);
        let results =
            compute_series_results(&f.summary, &f.summary_config, &f.graph).unwrap();

        let carol_id = f.summary.competitors[2].competitor_id;
        let carol = results
            .standings
            .iter()
            .find(|s| s.competitor_id == carol_id)
            .unwrap();
        let autumn = &carol.scores[1];
        assert_eq!(autumn.code.as_deref(), Some("DNC"));
        // SER+ 1 over three series entrants.
        assert_eq!(autumn.points, dec("4"));
        assert_eq!(carol.rank, 3);
    }

    #[test]
    fn test_absent_competitor_unscored_without_dnc_code() {
        let f = fixture(true, false);
        let results =
            compute_series_results(&f.summary, &f.summary_config, &f.graph).unwrap();

        let carol_id = f.summary.competitors[2].competitor_id;
        let carol = results
            .standings
            .iter()
            .find(|s| s.competitor_id == carol_id)
            .unwrap();
        assert_eq!(carol.scores.len(), 1);
    }

    #[test]
    fn test_flattened_children_keep_individual_races() {
        let f = fixture(false, false);
        let results =
            compute_series_results(&f.summary, &f.summary_config, &f.graph).unwrap();

        assert_eq!(results.races_completed, 4);
        let alice = &results.standings[0];
        // Alice: 1,1 in spring plus 1,1 in autumn.
        assert_eq!(alice.total, dec("4"));
        assert_eq!(alice.rank, 1);
    }

    #[test]
    fn test_nested_summary_is_configuration_error() {
        let mut f = fixture(true, true);
        f.summary.children[0].series.series_type = "summary".to_string();
        assert!(matches!(
            compute_series_results(&f.summary, &f.summary_config, &f.graph),
            Err(ScoringError::Configuration(_))
        ));
    }
}
