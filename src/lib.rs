//! Conflict-free timetable combination engine.
//!
//! Given a pool of class offerings, the offerings that must be kept and a
//! few soft preferences, [`solver::solve`] enumerates every clash-free
//! subset per scenario, scores it and returns the ranked list.

pub mod config;
pub mod conflict;
pub mod data;
pub mod error;
pub mod ingest;
pub mod scenario;
pub mod score;
pub mod server;
pub mod solver;
pub mod time;

pub use conflict::{ConflictPair, find_conflicts, is_conflict_free};
pub use data::{
    CombineMode, GenerationInput, GenerationOutput, Group, Offering, Preferences, RankedCombination,
    ScenarioConfig, ScenarioResult, ScenarioStatus,
};
pub use error::{InputError, ParseError, ScenarioError};
pub use solver::{MAX_COMBINATIONS, solve};
pub use time::{Shift, TimeSlot, Weekday, overlaps, parse_slots};
