use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::data::{Preferences, RankedCombination};
use crate::solver::Combination;

/// Number of top-ranked combinations flagged as suggestions.
pub const SUGGESTION_COUNT: usize = 4;

/// soft constraint weights
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreWeights {
    /// Per offering with at least one preferred shift.
    pub shift: i64,
    /// When the combination spans exactly the requested number of days.
    pub day_target: i64,
    /// Per extra section of the same course taken for the same programme.
    pub extra_section: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            shift: 1,
            day_target: 2,
            extra_section: 1,
        }
    }
}

pub fn score(combination: &Combination<'_>, preferences: &Preferences) -> i64 {
    let weights = &preferences.weights;
    let mut score = 0;

    // prefer the requested shifts
    if !preferences.preferred_shifts.is_empty() {
        let preferred = combination
            .members
            .iter()
            .filter(|o| {
                o.shifts()
                    .iter()
                    .any(|s| preferences.preferred_shifts.contains(s))
            })
            .count();
        score += weights.shift * preferred as i64;
    }

    if preferences.target_days > 0 && combination.day_count() == preferences.target_days {
        score += weights.day_target;
    }

    // several sections of one course for the same programme
    let extras: usize = combination
        .members
        .iter()
        .filter_map(|o| o.program.as_deref().map(|p| ((p, o.name.as_str()), o.section.as_str())))
        .into_group_map()
        .into_values()
        .map(|sections| sections.into_iter().unique().count() - 1)
        .sum();
    score += weights.extra_section * extras as i64;

    score
}

/// Best first: higher score, then fewer offerings, then member keys.
fn compare(a: &(Combination<'_>, i64), b: &(Combination<'_>, i64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| a.0.size().cmp(&b.0.size()))
        .then_with(|| a.0.sort_keys().cmp(&b.0.sort_keys()))
}

/// Scores, orders and flags the top [`SUGGESTION_COUNT`] combinations.
///
/// `truncated` tells whether the list was cut at the exploration cap and is
/// copied onto every result.
pub fn rank(
    combinations: Vec<Combination<'_>>,
    preferences: &Preferences,
    truncated: bool,
) -> Vec<RankedCombination> {
    let mut scored: Vec<(Combination<'_>, i64)> = combinations
        .into_iter()
        .map(|c| {
            let s = score(&c, preferences);
            (c, s)
        })
        .collect();
    scored.sort_by(compare);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (combination, score))| RankedCombination {
            size: combination.size(),
            day_count: combination.day_count(),
            members: combination.members.into_iter().cloned().collect(),
            score,
            suggested: i < SUGGESTION_COUNT,
            truncated,
        })
        .collect()
}
