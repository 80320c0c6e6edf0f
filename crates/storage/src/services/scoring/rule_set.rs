use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::models::{ScoreCode, ScoringSystem};

/// The fixed formula vocabulary. Stored as short names on score codes and
/// converted to a closed variant set when the rule set is resolved, so
/// exhaustiveness checking replaces runtime string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `COD`: score like the code named by `target`.
    ScoreLike { target: String },
    /// `FIN+`: finishers in this race plus `value`.
    FinishersPlus { value: i32 },
    /// `SER+`: distinct competitors anywhere in the series plus `value`.
    SeriesEntrantsPlus { value: i32 },
    /// `CTS+`: came-to-start count in this race plus `value`.
    CameToStartPlus { value: i32 },
    /// `AVE`: mean of the competitor's other non-discarded race points.
    Average,
    /// `AVE P`: as `AVE`, restricted to races before this one.
    AverageOfPrevious,
    /// `AVE ND`: as `AVE`, but discarded races stay in the mean.
    AverageNoDiscard,
    /// `PLC%`: place plus `value`% of the race's worst finisher points.
    PlacePercent { value: i32 },
    /// `MAN`: manually recorded points.
    Manual,
    /// `TIE`: ties with the next-better score in the race.
    TieWithNextBetter,
}

impl Formula {
    pub fn parse(
        name: &str,
        formula_value: Option<i32>,
        score_like: Option<&str>,
    ) -> ScoringResult<Self> {
        let value = formula_value.unwrap_or(0);
        match name.trim() {
            "COD" => {
                let target = score_like
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        ScoringError::Configuration(
                            "COD formula requires a score_like reference".to_string(),
                        )
                    })?;
                Ok(Self::ScoreLike {
                    target: target.to_uppercase(),
                })
            }
            "FIN+" => Ok(Self::FinishersPlus { value }),
            "SER+" => Ok(Self::SeriesEntrantsPlus { value }),
            "CTS+" => Ok(Self::CameToStartPlus { value }),
            "AVE" => Ok(Self::Average),
            "AVE P" => Ok(Self::AverageOfPrevious),
            "AVE ND" => Ok(Self::AverageNoDiscard),
            "PLC%" => {
                let value = formula_value.ok_or_else(|| {
                    ScoringError::Configuration(
                        "PLC% formula requires a formula_value percentage".to_string(),
                    )
                })?;
                Ok(Self::PlacePercent { value })
            }
            "MAN" => Ok(Self::Manual),
            "TIE" => Ok(Self::TieWithNextBetter),
            other => Err(ScoringError::Configuration(format!(
                "unknown score formula '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScoreLike { .. } => "COD",
            Self::FinishersPlus { .. } => "FIN+",
            Self::SeriesEntrantsPlus { .. } => "SER+",
            Self::CameToStartPlus { .. } => "CTS+",
            Self::Average => "AVE",
            Self::AverageOfPrevious => "AVE P",
            Self::AverageNoDiscard => "AVE ND",
            Self::PlacePercent { .. } => "PLC%",
            Self::Manual => "MAN",
            Self::TieWithNextBetter => "TIE",
        }
    }
}

/// A score code with its formula parsed into the typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCode {
    pub name: String,
    pub formula: Formula,
    pub discardable: bool,
    pub came_to_start: bool,
    pub started: bool,
    pub finished: bool,
    pub preserve_result: bool,
    pub adjust_other_scores: bool,
    pub count_as_participation: bool,
}

impl ResolvedCode {
    fn from_row(code: &ScoreCode) -> ScoringResult<Self> {
        let formula = Formula::parse(
            &code.formula,
            code.formula_value,
            code.score_like.as_deref(),
        )
        .map_err(|e| match e {
            ScoringError::Configuration(msg) => {
                ScoringError::Configuration(format!("code '{}': {msg}", code.name))
            }
            other => other,
        })?;
        Ok(Self {
            name: code.name.trim().to_uppercase(),
            formula,
            discardable: code.discardable,
            came_to_start: code.came_to_start,
            started: code.started,
            finished: code.finished,
            preserve_result: code.preserve_result,
            adjust_other_scores: code.adjust_other_scores,
            count_as_participation: code.count_as_participation,
        })
    }
}

/// The effective, merged code set of a scoring system and its ancestors.
/// Keyed by uppercase code name; a name defined closer to the leaf
/// shadows every ancestor definition.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    codes: BTreeMap<String, ResolvedCode>,
}

impl RuleSet {
    pub fn get(&self, name: &str) -> Option<&ResolvedCode> {
        self.codes.get(&name.trim().to_uppercase())
    }

    pub fn codes(&self) -> impl Iterator<Item = &ResolvedCode> {
        self.codes.values()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Looks up `name` and follows `COD` references to the terminal code.
    /// Returns (direct, terminal): the direct code supplies the flags, the
    /// terminal one the formula actually evaluated.
    pub(crate) fn resolve_terminal<'a>(
        &'a self,
        name: &str,
    ) -> ScoringResult<(&'a ResolvedCode, &'a ResolvedCode)> {
        let direct = self
            .get(name)
            .ok_or_else(|| ScoringError::UnresolvedCodeReference(name.trim().to_uppercase()))?;

        let mut seen = HashSet::new();
        seen.insert(direct.name.clone());
        let mut terminal = direct;
        while let Formula::ScoreLike { target } = &terminal.formula {
            if !seen.insert(target.clone()) {
                return Err(ScoringError::UnresolvedCodeReference(direct.name.clone()));
            }
            terminal = self
                .get(target)
                .ok_or_else(|| ScoringError::UnresolvedCodeReference(target.clone()))?;
        }
        Ok((direct, terminal))
    }
}

/// Prefetched scoring systems and their codes, keyed by system id. The
/// resolver walks parent references through this graph rather than live
/// object back-references.
#[derive(Debug, Clone, Default)]
pub struct ScoringSystemGraph {
    systems: HashMap<Uuid, ScoringSystem>,
    codes: HashMap<Uuid, Vec<ScoreCode>>,
}

impl ScoringSystemGraph {
    pub fn insert_system(&mut self, system: ScoringSystem, codes: Vec<ScoreCode>) {
        self.codes.insert(system.system_id, codes);
        self.systems.insert(system.system_id, system);
    }

    pub fn system(&self, id: Uuid) -> Option<&ScoringSystem> {
        self.systems.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.systems.contains_key(&id)
    }

    fn codes_of(&self, id: Uuid) -> &[ScoreCode] {
        self.codes.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Walks the parent chain of `leaf_id` and merges score codes, child
/// definitions shadowing ancestor ones by name. A revisited system id or
/// a missing referenced system is a configuration error.
pub fn resolve_rule_set(leaf_id: Uuid, graph: &ScoringSystemGraph) -> ScoringResult<RuleSet> {
    let mut merged: BTreeMap<String, ResolvedCode> = BTreeMap::new();
    let mut visited = HashSet::new();
    let mut current = Some(leaf_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(ScoringError::Configuration(format!(
                "scoring system inheritance loop detected at {id}"
            )));
        }
        let system = graph.system(id).ok_or_else(|| {
            ScoringError::Configuration(format!("referenced scoring system {id} does not exist"))
        })?;
        for code in graph.codes_of(id) {
            let key = code.name.trim().to_uppercase();
            if !merged.contains_key(&key) {
                merged.insert(key, ResolvedCode::from_row(code)?);
            }
        }
        current = system.parent_system_id;
    }

    Ok(RuleSet { codes: merged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::test_support::{code, system};

    #[test]
    fn test_formula_parse_vocabulary() {
        assert_eq!(
            Formula::parse("FIN+", Some(2), None).unwrap(),
            Formula::FinishersPlus { value: 2 }
        );
        assert_eq!(
            Formula::parse("AVE P", None, None).unwrap(),
            Formula::AverageOfPrevious
        );
        assert_eq!(
            Formula::parse("COD", None, Some("dnf")).unwrap(),
            Formula::ScoreLike {
                target: "DNF".to_string()
            }
        );
    }

    #[test]
    fn test_formula_parse_rejects_unknown() {
        assert!(matches!(
            Formula::parse("XYZ", None, None),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_plc_percent_requires_value() {
        assert!(matches!(
            Formula::parse("PLC%", None, None),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_cod_requires_score_like() {
        assert!(matches!(
            Formula::parse("COD", None, None),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_child_shadows_parent_code() {
        let mut graph = ScoringSystemGraph::default();
        let parent = system("RRS", None);
        let child = system("Club", Some(parent.system_id));
        let child_id = child.system_id;
        graph.insert_system(
            parent.clone(),
            vec![
                code(parent.system_id, "DNC", "FIN+", Some(1), None),
                code(parent.system_id, "DNF", "FIN+", Some(1), None),
            ],
        );
        graph.insert_system(
            child.clone(),
            vec![code(child_id, "DNC", "FIN+", Some(5), None)],
        );

        let rules = resolve_rule_set(child_id, &graph).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.get("DNC").unwrap().formula,
            Formula::FinishersPlus { value: 5 }
        );
        assert_eq!(
            rules.get("dnf").unwrap().formula,
            Formula::FinishersPlus { value: 1 }
        );
    }

    #[test]
    fn test_inheritance_cycle_is_configuration_error() {
        let mut graph = ScoringSystemGraph::default();
        let mut a = system("A", None);
        let b = system("B", Some(a.system_id));
        a.parent_system_id = Some(b.system_id);
        let leaf = b.system_id;
        graph.insert_system(a, vec![]);
        graph.insert_system(b, vec![]);

        assert!(matches!(
            resolve_rule_set(leaf, &graph),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_parent_is_configuration_error() {
        let mut graph = ScoringSystemGraph::default();
        let ghost = Uuid::new_v4();
        let child = system("Club", Some(ghost));
        let leaf = child.system_id;
        graph.insert_system(child, vec![]);

        assert!(matches!(
            resolve_rule_set(leaf, &graph),
            Err(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_cod_chain_resolves_to_terminal() {
        let mut graph = ScoringSystemGraph::default();
        let sys = system("Club", None);
        let id = sys.system_id;
        graph.insert_system(
            sys,
            vec![
                code(id, "DNF", "FIN+", Some(2), None),
                code(id, "RET", "COD", None, Some("DNF")),
            ],
        );
        let rules = resolve_rule_set(id, &graph).unwrap();

        let (direct, terminal) = rules.resolve_terminal("RET").unwrap();
        assert_eq!(direct.name, "RET");
        assert_eq!(terminal.formula, Formula::FinishersPlus { value: 2 });
    }

    #[test]
    fn test_cod_cycle_is_unresolved_reference() {
        let mut graph = ScoringSystemGraph::default();
        let sys = system("Club", None);
        let id = sys.system_id;
        graph.insert_system(
            sys,
            vec![
                code(id, "AAA", "COD", None, Some("BBB")),
                code(id, "BBB", "COD", None, Some("AAA")),
            ],
        );
        let rules = resolve_rule_set(id, &graph).unwrap();

        assert!(matches!(
            rules.resolve_terminal("AAA"),
            Err(ScoringError::UnresolvedCodeReference(_))
        ));
    }

    #[test]
    fn test_dangling_reference_is_unresolved() {
        let mut graph = ScoringSystemGraph::default();
        let sys = system("Club", None);
        let id = sys.system_id;
        graph.insert_system(sys, vec![code(id, "RET", "COD", None, Some("GONE"))]);
        let rules = resolve_rule_set(id, &graph).unwrap();

        assert_eq!(
            rules.resolve_terminal("RET"),
            Err(ScoringError::UnresolvedCodeReference("GONE".to_string()))
        );
    }
}
