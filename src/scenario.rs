//! Turns fixed offerings and their groups into independent generation runs.
//!
//! Under [`CombineMode::Or`] every group with at least one fixed member gets
//! its own scenario; with no populated group a single `general` scenario is
//! produced. Under [`CombineMode::And`] one `combined` scenario requires all
//! groups at once. Ungrouped fixed offerings join every required set when
//! `ungrouped_mandatory` is set and otherwise stay optional.

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::conflict::find_conflicts;
use crate::data::{CombineMode, Group, Offering, ScenarioConfig, ScenarioLabel};
use crate::error::ScenarioError;

pub const GENERAL_LABEL: &str = "general";
pub const COMBINED_LABEL: &str = "combined";

/// One generation run: offerings that must be present and the rest of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario<'a> {
    pub label: ScenarioLabel,
    pub required: Vec<&'a Offering>,
    pub optional: Vec<&'a Offering>,
}

impl<'a> Scenario<'a> {
    /// Splits `pool` into required and optional, keeping pool order in both.
    fn split(label: impl Into<ScenarioLabel>, pool: &'a [Offering], required: &BTreeSet<&str>) -> Self {
        let (required, optional): (Vec<&'a Offering>, Vec<&'a Offering>) =
            pool.iter().partition(|o| required.contains(o.id.as_str()));
        Self {
            label: label.into(),
            required,
            optional,
        }
    }

    pub fn required_ids(&self) -> Vec<String> {
        self.required.iter().map(|o| o.id.clone()).collect()
    }

    fn check(self) -> Result<Self, ScenarioError> {
        let conflicts = find_conflicts(self.required.iter().copied());
        if conflicts.is_empty() {
            Ok(self)
        } else {
            Err(ScenarioError::ConflictingRequired {
                required: self.required_ids(),
                label: self.label,
                conflicts,
            })
        }
    }
}

/// Derives the scenarios to generate for `pool`.
///
/// `pool` is expected to hold unique offering ids. A scenario whose required
/// offerings clash with each other comes back as an error; the others are
/// unaffected.
pub fn partition<'a>(
    pool: &'a [Offering],
    config: &ScenarioConfig,
) -> Vec<Result<Scenario<'a>, ScenarioError>> {
    let in_pool: BTreeSet<&str> = pool.iter().map(|o| o.id.as_str()).collect();

    let mut ungrouped: BTreeSet<&str> = BTreeSet::new();
    let mut groups: BTreeMap<Group, BTreeSet<&str>> = BTreeMap::new();
    for (id, group) in &config.fixed {
        if !in_pool.contains(id.as_str()) {
            warn!("Fixed offering {id} is not in the candidate pool; ignoring it.");
            continue;
        }
        match group {
            Group::Ungrouped => {
                ungrouped.insert(id.as_str());
            }
            group => {
                groups.entry(*group).or_default().insert(id.as_str());
            }
        }
    }

    let base: BTreeSet<&str> = if config.ungrouped_mandatory {
        ungrouped
    } else {
        BTreeSet::new()
    };

    let scenarios: Vec<Scenario<'a>> = match config.mode {
        CombineMode::Or if groups.is_empty() => vec![Scenario::split(GENERAL_LABEL, pool, &base)],
        CombineMode::Or => groups
            .iter()
            .map(|(group, members)| {
                let required: BTreeSet<&str> = base.union(members).copied().collect();
                Scenario::split(group.label(), pool, &required)
            })
            .collect(),
        CombineMode::And => {
            let mut required = base;
            required.extend(groups.values().flatten().copied());
            vec![Scenario::split(COMBINED_LABEL, pool, &required)]
        }
    };

    debug!(
        "Partitioned {} offerings into {} scenario(s) ({:?} mode).",
        pool.len(),
        scenarios.len(),
        config.mode
    );

    scenarios.into_iter().map(Scenario::check).collect()
}

/// Whether ungrouped fixed offerings should default to mandatory:
/// true when exactly one fixed offering is left without a group.
pub fn suggest_ungrouped_mandatory(config: &ScenarioConfig) -> bool {
    config
        .fixed
        .values()
        .filter(|g| **g == Group::Ungrouped)
        .count()
        == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_slots;

    fn offering(id: &str, spec: &str) -> Offering {
        Offering::new(id, id, "01", format!("Course {id}")).with_slots(parse_slots(spec).unwrap())
    }

    fn pool() -> Vec<Offering> {
        vec![
            offering("A", "SEG - 08:00 às 10:00"),
            offering("B", "TER - 08:00 às 10:00"),
            offering("C", "QUA - 08:00 às 10:00"),
            offering("D", "QUI - 08:00 às 10:00"),
            offering("E", "SEX - 08:00 às 10:00"),
        ]
    }

    fn ids(offerings: &[&Offering]) -> Vec<String> {
        offerings.iter().map(|o| o.id.clone()).collect()
    }

    fn ok<'a>(results: Vec<Result<Scenario<'a>, ScenarioError>>) -> Vec<Scenario<'a>> {
        results.into_iter().map(Result::unwrap).collect()
    }

    #[test]
    fn test_no_fixed_yields_general() {
        let pool = pool();
        let scenarios = ok(partition(&pool, &ScenarioConfig::default()));
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].label, GENERAL_LABEL);
        assert!(scenarios[0].required.is_empty());
        assert_eq!(scenarios[0].optional.len(), 5);
    }

    #[test]
    fn test_or_mode_one_scenario_per_populated_group() {
        let pool = pool();
        let config = ScenarioConfig::default()
            .fix("A", Group::A)
            .fix("B", Group::A)
            .fix("C", Group::C)
            .fix("D", Group::Ungrouped)
            .with_ungrouped_mandatory(true);
        let scenarios = ok(partition(&pool, &config));
        let labels: Vec<_> = scenarios.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "C"]);
        assert_eq!(ids(&scenarios[0].required), vec!["A", "B", "D"]);
        assert_eq!(ids(&scenarios[0].optional), vec!["C", "E"]);
        assert_eq!(ids(&scenarios[1].required), vec!["C", "D"]);
        assert_eq!(ids(&scenarios[1].optional), vec!["A", "B", "E"]);
    }

    #[test]
    fn test_ungrouped_optional_when_not_mandatory() {
        let pool = pool();
        let config = ScenarioConfig::default()
            .fix("A", Group::B)
            .fix("D", Group::Ungrouped);
        let scenarios = ok(partition(&pool, &config));
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].label, "B");
        assert_eq!(ids(&scenarios[0].required), vec!["A"]);
        assert!(ids(&scenarios[0].optional).contains(&"D".to_string()));
    }

    #[test]
    fn test_or_mode_only_ungrouped_gives_general() {
        let pool = pool();
        let config = ScenarioConfig::default()
            .fix("E", Group::Ungrouped)
            .with_ungrouped_mandatory(true);
        let scenarios = ok(partition(&pool, &config));
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].label, GENERAL_LABEL);
        assert_eq!(ids(&scenarios[0].required), vec!["E"]);
    }

    #[test]
    fn test_and_mode_merges_all_groups() {
        let pool = pool();
        let config = ScenarioConfig::default()
            .with_mode(CombineMode::And)
            .fix("A", Group::A)
            .fix("B", Group::B)
            .fix("C", Group::C)
            .fix("E", Group::Ungrouped);
        let scenarios = ok(partition(&pool, &config));
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].label, COMBINED_LABEL);
        assert_eq!(ids(&scenarios[0].required), vec!["A", "B", "C"]);
        assert_eq!(ids(&scenarios[0].optional), vec!["D", "E"]);
    }

    #[test]
    fn test_conflicting_required_is_scenario_scoped() {
        let mut pool = pool();
        pool.push(offering("X", "SEG - 09:00 às 11:00"));
        let config = ScenarioConfig::default()
            .fix("A", Group::A)
            .fix("X", Group::A)
            .fix("B", Group::B);
        let results = partition(&pool, &config);
        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(ScenarioError::ConflictingRequired {
                label,
                required,
                conflicts,
            }) => {
                assert_eq!(label, "A");
                assert_eq!(required, &vec!["A".to_string(), "X".to_string()]);
                assert_eq!(conflicts.len(), 1);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(results[1].as_ref().unwrap().label, "B");
    }

    #[test]
    fn test_unknown_fixed_ids_are_ignored() {
        let pool = pool();
        let config = ScenarioConfig::default().fix("Z", Group::A);
        let scenarios = ok(partition(&pool, &config));
        assert_eq!(scenarios[0].label, GENERAL_LABEL);
    }

    #[test]
    fn test_suggest_ungrouped_mandatory() {
        let one = ScenarioConfig::default()
            .fix("A", Group::Ungrouped)
            .fix("B", Group::A);
        assert!(suggest_ungrouped_mandatory(&one));
        let two = one.clone().fix("C", Group::Ungrouped);
        assert!(!suggest_ungrouped_mandatory(&two));
        assert!(!suggest_ungrouped_mandatory(&ScenarioConfig::default()));
    }
}
