use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::conflict::ConflictPair;
use crate::error::{InputError, ScenarioError};
use crate::score::ScoreWeights;
use crate::solver::MAX_COMBINATIONS;
use crate::time::{Shift, TimeSlot, Weekday};

// Type aliases for clarity
pub type OfferingId = String;
pub type ScenarioLabel = String;

/// One timetabled class of a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offering {
    pub id: OfferingId,
    pub code: String,
    pub section: String,
    pub name: String,
    /// Degree programme the class is offered to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    pub slots: Vec<TimeSlot>,
}

impl Offering {
    pub fn new(
        id: impl Into<OfferingId>,
        code: impl Into<String>,
        section: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            section: section.into(),
            name: name.into(),
            program: None,
            slots: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn with_slots(mut self, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.slots.extend(slots);
        self
    }

    /// Shifts of all slots of this offering.
    pub fn shifts(&self) -> BTreeSet<Shift> {
        self.slots.iter().map(TimeSlot::shift).collect()
    }

    pub fn days(&self) -> BTreeSet<Weekday> {
        self.slots.iter().map(|s| s.day).collect()
    }

    /// Ordering key used wherever output must be deterministic.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.code, &self.section, &self.id)
    }
}

/// Group a fixed offering is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Default)]
pub enum Group {
    #[default]
    #[serde(rename = "none")]
    Ungrouped,
    A,
    B,
    C,
}

impl Group {
    pub const fn label(self) -> &'static str {
        match self {
            Group::Ungrouped => "none",
            Group::A => "A",
            Group::B => "B",
            Group::C => "C",
        }
    }
}

/// How groups of fixed offerings combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// One scenario per non-empty group.
    #[default]
    Or,
    /// A single scenario requiring every group.
    And,
}

/// Fixed offerings and the way they turn into scenarios.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioConfig {
    pub mode: CombineMode,
    /// Fixed offering ids and the group each belongs to.
    pub fixed: BTreeMap<OfferingId, Group>,
    /// Whether ungrouped fixed offerings are required in every scenario.
    pub ungrouped_mandatory: bool,
}

impl ScenarioConfig {
    pub fn fix(mut self, id: impl Into<OfferingId>, group: Group) -> Self {
        self.fixed.insert(id.into(), group);
        self
    }

    pub fn with_mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ungrouped_mandatory(mut self, mandatory: bool) -> Self {
        self.ungrouped_mandatory = mandatory;
        self
    }
}

/// Soft preferences and hard size/day targets for one generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Exact number of offerings per combination; 0 accepts any size.
    pub target_size: usize,
    /// Exact number of distinct weekdays per combination; 0 accepts any.
    pub target_days: usize,
    pub preferred_shifts: BTreeSet<Shift>,
    /// Exploration cap on valid combinations per scenario.
    pub max_combinations: usize,
    /// Only accept combinations spanning morning+afternoon or afternoon+evening.
    pub consecutive_shifts_only: bool,
    pub weights: ScoreWeights,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            target_size: 0,
            target_days: 0,
            preferred_shifts: BTreeSet::new(),
            max_combinations: MAX_COMBINATIONS,
            consecutive_shifts_only: false,
            weights: ScoreWeights::default(),
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.max_combinations == 0 {
            return Err(InputError::ZeroCap);
        }
        if self.target_days > Weekday::ALL.len() {
            return Err(InputError::TooManyDays(self.target_days));
        }
        Ok(())
    }
}

/// The complete input for one generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    /// Selected offerings; the candidate pool.
    pub offerings: Vec<Offering>,
    #[serde(default)]
    pub scenarios: ScenarioConfig,
    #[serde(default)]
    pub preferences: Preferences,
}

/// A scored, ranked combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCombination {
    pub members: Vec<Offering>,
    pub score: i64,
    pub size: usize,
    pub day_count: usize,
    /// Among the top suggestions of its scenario.
    pub suggested: bool,
    /// The list this combination belongs to was cut at the exploration cap.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ScenarioStatus {
    Generated,
    Unsatisfiable { reason: ScenarioError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub label: ScenarioLabel,
    pub required: Vec<OfferingId>,
    #[serde(flatten)]
    pub status: ScenarioStatus,
    pub combinations: Vec<RankedCombination>,
    /// Enumeration stopped at the exploration cap with more valid combinations left.
    pub truncated: bool,
    /// Candidate subsets examined.
    pub examined: usize,
}

/// The final output of the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub scenarios: BTreeMap<ScenarioLabel, ScenarioResult>,
    /// Conflicts among the whole candidate pool, independent of scenarios.
    pub conflicts: Vec<ConflictPair>,
}
