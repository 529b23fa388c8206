use crate::conflict::{conflicts_with, find_conflicts, is_conflict_free};
use crate::data::{
    GenerationInput, GenerationOutput, Offering, Preferences, ScenarioResult, ScenarioStatus,
};
use crate::error::InputError;
use crate::scenario::{Scenario, partition};
use crate::score::rank;
use crate::time::{Shift, Weekday};
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::ControlFlow;
use std::time::Instant;

/// Default exploration cap: valid combinations collected per scenario.
pub const MAX_COMBINATIONS: usize = 100_000;

/// A conflict-free set of offerings, members ordered by [`Offering::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'a> {
    pub members: Vec<&'a Offering>,
}

impl<'a> Combination<'a> {
    pub fn new(mut members: Vec<&'a Offering>) -> Self {
        members.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self { members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn days(&self) -> BTreeSet<Weekday> {
        days_of(&self.members)
    }

    pub fn day_count(&self) -> usize {
        self.days().len()
    }

    pub fn shifts(&self) -> BTreeSet<Shift> {
        self.members.iter().flat_map(|o| o.shifts()).collect()
    }

    /// Member identity, independent of how the combination was reached.
    pub fn ids(&self) -> BTreeSet<&'a str> {
        self.members.iter().map(|o| o.id.as_str()).collect()
    }

    pub fn sort_keys(&self) -> Vec<(&'a str, &'a str, &'a str)> {
        self.members.iter().map(|o| o.sort_key()).collect()
    }
}

fn days_of(offerings: &[&Offering]) -> BTreeSet<Weekday> {
    offerings.iter().flat_map(|o| o.days()).collect()
}

/// Hard constraints applied to every candidate combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    /// Exact size; 0 = any.
    pub target_size: usize,
    /// Exact number of distinct weekdays; 0 = any.
    pub target_days: usize,
    pub consecutive_shifts_only: bool,
    pub max_combinations: usize,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            target_size: 0,
            target_days: 0,
            consecutive_shifts_only: false,
            max_combinations: MAX_COMBINATIONS,
        }
    }
}

impl From<&Preferences> for Constraints {
    fn from(p: &Preferences) -> Self {
        Self {
            target_size: p.target_size,
            target_days: p.target_days,
            consecutive_shifts_only: p.consecutive_shifts_only,
            max_combinations: p.max_combinations,
        }
    }
}

/// Only two adjacent shifts are accepted: morning+afternoon or afternoon+evening.
pub fn is_consecutive_shift_pair(shifts: &BTreeSet<Shift>) -> bool {
    let pair = |a, b| BTreeSet::from([a, b]);
    *shifts == pair(Shift::Morning, Shift::Afternoon) || *shifts == pair(Shift::Afternoon, Shift::Evening)
}

/// Outcome of enumerating one scenario.
#[derive(Debug, Clone, Default)]
pub struct Generated<'a> {
    pub combinations: Vec<Combination<'a>>,
    /// More valid combinations exist beyond the exploration cap.
    pub truncated: bool,
    /// Candidate subsets examined.
    pub examined: usize,
}

/// Enumerates the valid combinations of a scenario, smallest first.
///
/// Every result contains all required offerings, is conflict-free and meets
/// the size/day targets. Collection stops at `max_combinations`.
pub fn generate<'a>(scenario: &Scenario<'a>, constraints: &Constraints) -> Generated<'a> {
    let required = &scenario.required;
    let mut generated = Generated::default();

    if constraints.target_size > 0 && required.len() > constraints.target_size {
        warn!(
            "Scenario {}: {} required offerings exceed the target size of {}.",
            scenario.label,
            required.len(),
            constraints.target_size
        );
        return generated;
    }
    let required_days = days_of(required);
    if constraints.target_days > 0 && required_days.len() > constraints.target_days {
        warn!(
            "Scenario {}: required offerings span {} days, more than the target of {}.",
            scenario.label,
            required_days.len(),
            constraints.target_days
        );
        return generated;
    }
    if !is_conflict_free(required.iter().copied()) {
        warn!("Scenario {}: required offerings overlap; nothing to generate.", scenario.label);
        return generated;
    }

    // pre-filter; an optional offering clashing with a required one never fits
    let optional: Vec<&'a Offering> = scenario
        .optional
        .iter()
        .copied()
        .filter(|o| !required.iter().any(|r| conflicts_with(r, o)))
        .collect();
    trace!(
        "Scenario {}: {} of {} optional offerings are compatible with the required set.",
        scenario.label,
        optional.len(),
        scenario.optional.len()
    );

    let sizes = match constraints.target_size {
        0 => 0..=optional.len(),
        target => {
            let extra = target - required.len();
            if extra > optional.len() {
                debug!(
                    "Scenario {}: not enough optional offerings to reach size {}.",
                    scenario.label, target
                );
                return generated;
            }
            extra..=extra
        }
    };

    // compatible[i][j]: optional offerings i and j can sit together
    let compatible: Vec<Vec<bool>> = optional
        .iter()
        .map(|a| optional.iter().map(|b| !conflicts_with(a, b)).collect())
        .collect();

    let mut seen: HashSet<BTreeSet<&'a str>> = HashSet::new();
    for k in sizes {
        let mut reached = false;
        let flow = extend(&compatible, 0, k, &mut Vec::new(), &mut |chosen| {
            reached = true;
            generated.examined += 1;

            let mut members = required.clone();
            members.extend(chosen.iter().map(|&i| optional[i]));

            if constraints.target_days > 0 && days_of(&members).len() != constraints.target_days {
                return ControlFlow::Continue(());
            }
            let combination = Combination::new(members);
            if constraints.consecutive_shifts_only && !is_consecutive_shift_pair(&combination.shifts()) {
                return ControlFlow::Continue(());
            }
            if !is_conflict_free(combination.members.iter().copied()) || !seen.insert(combination.ids()) {
                return ControlFlow::Continue(());
            }

            if generated.combinations.len() == constraints.max_combinations {
                generated.truncated = true;
                return ControlFlow::Break(());
            }
            generated.combinations.push(combination);
            ControlFlow::Continue(())
        });

        if flow.is_break() {
            info!(
                "Scenario {}: exploration cap of {} reached; stopping.",
                scenario.label, constraints.max_combinations
            );
            break;
        }
        // no clash-free set of size k means none of any larger size
        if !reached {
            debug!("Scenario {}: no compatible set of {k} optional offerings.", scenario.label);
            break;
        }
    }

    generated
}

/// Backtracking over `compatible`: visits every pairwise-compatible index set
/// of size `remaining` (on top of `chosen`) in lexicographic order.
fn extend(
    compatible: &[Vec<bool>],
    start: usize,
    remaining: usize,
    chosen: &mut Vec<usize>,
    visit: &mut dyn FnMut(&[usize]) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if remaining == 0 {
        return visit(chosen);
    }
    let n = compatible.len();
    for i in start..n {
        if i + remaining > n {
            break;
        }
        if chosen.iter().all(|&j| compatible[j][i]) {
            chosen.push(i);
            let flow = extend(compatible, i + 1, remaining - 1, chosen, visit);
            chosen.pop();
            flow?;
        }
    }
    ControlFlow::Continue(())
}

/// Runs every scenario of `input` and ranks the results.
pub fn solve(input: &GenerationInput) -> Result<GenerationOutput, InputError> {
    let start_time = Instant::now();
    input.preferences.validate()?;

    // member-set identity needs unique ids
    let mut ids = HashSet::new();
    let pool: Vec<Offering> = input
        .offerings
        .iter()
        .filter(|o| {
            let fresh = ids.insert(o.id.as_str());
            if !fresh {
                warn!("Duplicate offering id {} in the pool; keeping the first.", o.id);
            }
            fresh
        })
        .cloned()
        .collect();

    info!(
        "Generating combinations for {} offerings ({} fixed, {:?} mode)...",
        pool.len(),
        input.scenarios.fixed.len(),
        input.scenarios.mode
    );

    let conflicts = find_conflicts(&pool);
    debug!("Candidate pool has {} conflicting pair(s).", conflicts.len());

    let constraints = Constraints::from(&input.preferences);
    let mut scenarios = BTreeMap::new();
    for scenario in partition(&pool, &input.scenarios) {
        let result = match scenario {
            Ok(scenario) => {
                let generated = generate(&scenario, &constraints);
                info!(
                    "Scenario {}: {} valid combination(s) from {} candidate(s){}.",
                    scenario.label,
                    generated.combinations.len(),
                    generated.examined,
                    if generated.truncated { " (truncated)" } else { "" }
                );
                ScenarioResult {
                    label: scenario.label.clone(),
                    required: scenario.required_ids(),
                    status: ScenarioStatus::Generated,
                    combinations: rank(generated.combinations, &input.preferences, generated.truncated),
                    truncated: generated.truncated,
                    examined: generated.examined,
                }
            }
            Err(error) => {
                warn!("{error}");
                ScenarioResult {
                    label: error.label().to_string(),
                    required: error.required().to_vec(),
                    status: ScenarioStatus::Unsatisfiable { reason: error },
                    combinations: Vec::new(),
                    truncated: false,
                    examined: 0,
                }
            }
        };
        scenarios.insert(result.label.clone(), result);
    }

    info!("Generation finished in {:.2?}", start_time.elapsed());
    Ok(GenerationOutput {
        scenarios,
        conflicts,
    })
}
