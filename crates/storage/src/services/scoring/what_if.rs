use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::ScoringResult;
use crate::models::SeriesResults;

use super::discards::DiscardSchedule;
use super::rule_set::ScoringSystemGraph;
use super::{ScoringConfig, SeriesData, compute_series_results, validate_fraction};

/// Speculative substitutions layered over a series' live configuration.
/// Absent fields keep the live value; with every field absent the run is
/// identical to the live computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhatIfOverrides {
    pub scoring_system_id: Option<Uuid>,
    pub discard_count: Option<u32>,
    pub participation_percent: Option<Decimal>,
}

/// Re-runs the full pipeline under the overrides. The live rule set is
/// cloned into a private configuration, so nothing shared is mutated and
/// nothing is persisted.
pub fn run(
    data: &SeriesData,
    live: &ScoringConfig,
    overrides: &WhatIfOverrides,
    graph: &ScoringSystemGraph,
) -> ScoringResult<SeriesResults> {
    let mut config = match overrides.scoring_system_id {
        Some(system_id) => ScoringConfig::from_graph(system_id, graph)?,
        None => live.clone(),
    };
    if let Some(count) = overrides.discard_count {
        config.discards = DiscardSchedule::fixed(count);
    }
    if let Some(fraction) = validate_fraction(overrides.participation_percent)? {
        config.participation_percent = Some(fraction);
    }
    compute_series_results(data, &config, graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;
    use crate::services::scoring::test_support::{
        code, competitor, dec, race, race_score, series, system,
    };

    struct Fixture {
        graph: ScoringSystemGraph,
        live: ScoringConfig,
        data: SeriesData,
        alt_system_id: Uuid,
    }

    fn fixture() -> Fixture {
        let mut graph = ScoringSystemGraph::default();

        let mut live_sys = system("Club", None);
        live_sys.discard_pattern = "0,0,0".to_string();
        let live_id = live_sys.system_id;
        graph.insert_system(
            live_sys,
            vec![code(live_id, "DNF", "FIN+", Some(1), None)],
        );

        let mut alt_sys = system("Championship", None);
        alt_sys.discard_pattern = "0,0,0".to_string();
        let alt_id = alt_sys.system_id;
        graph.insert_system(
            alt_sys,
            vec![code(alt_id, "DNF", "FIN+", Some(5), None)],
        );

        let s = series(live_id, "standard");
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
            race_score(&races[1], &a, Some(2), None),
            race_score(&races[1], &b, Some(1), None),
            race_score(&races[2], &a, None, Some("DNF")),
            race_score(&races[2], &b, Some(1), None),
        ];
        let data = SeriesData {
            series: s,
            races,
            scores,
            competitors: vec![a, b],
            children: vec![],
        };
        let live = ScoringConfig::from_graph(live_id, &graph).unwrap();
        Fixture {
            graph,
            live,
            data,
            alt_system_id: alt_id,
        }
    }

    #[test]
    fn test_empty_overrides_match_live_results() {
        let f = fixture();
        let live = compute_series_results(&f.data, &f.live, &f.graph).unwrap();
        let what_if = run(&f.data, &f.live, &WhatIfOverrides::default(), &f.graph).unwrap();
        assert_eq!(live, what_if);
    }

    #[test]
    fn test_alternate_system_changes_code_points() {
        let f = fixture();
        let overrides = WhatIfOverrides {
            scoring_system_id: Some(f.alt_system_id),
            ..Default::default()
        };
        let results = run(&f.data, &f.live, &overrides, &f.graph).unwrap();

        let alice_id = f.data.competitors[0].competitor_id;
        let alice = results
            .standings
            .iter()
            .find(|s| s.competitor_id == alice_id)
            .unwrap();
        // One finisher in race 3, FIN+ 5 instead of FIN+ 1.
        assert_eq!(alice.scores[2].points, dec("6"));
        assert_eq!(results.scoring_system_id, f.alt_system_id);
    }

    #[test]
    fn test_discard_count_override_applies() {
        let f = fixture();
        let overrides = WhatIfOverrides {
            discard_count: Some(1),
            ..Default::default()
        };
        let results = run(&f.data, &f.live, &overrides, &f.graph).unwrap();

        let alice_id = f.data.competitors[0].competitor_id;
        let alice = results
            .standings
            .iter()
            .find(|s| s.competitor_id == alice_id)
            .unwrap();
        // The live pattern grants no discards; the override drops the DNF.
        assert!(alice.scores[2].discarded);
        assert_eq!(alice.total, dec("3"));
    }

    #[test]
    fn test_live_state_untouched_by_what_if() {
        let f = fixture();
        let before = compute_series_results(&f.data, &f.live, &f.graph).unwrap();
        let overrides = WhatIfOverrides {
            scoring_system_id: Some(f.alt_system_id),
            discard_count: Some(1),
            ..Default::default()
        };
        run(&f.data, &f.live, &overrides, &f.graph).unwrap();
        let after = compute_series_results(&f.data, &f.live, &f.graph).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_participation_override_validated() {
        let f = fixture();
        let overrides = WhatIfOverrides {
            participation_percent: Some(dec("2")),
            ..Default::default()
        };
        assert!(matches!(
            run(&f.data, &f.live, &overrides, &f.graph),
            Err(ScoringError::Configuration(_))
        ));
    }
}
