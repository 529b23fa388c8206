//! Pairwise clash detection between offerings.
//!
//! Every unordered pair of offerings is compared slot by slot. Pools are a
//! handful of classes picked by a coordinator, so the quadratic scan is fine.

use chrono::NaiveTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Offering, OfferingId};
use crate::time::{TimeSlot, Weekday};

/// One side of a clash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSide {
    pub id: OfferingId,
    pub code: String,
    pub section: String,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ConflictSide {
    fn new(offering: &Offering, slot: &TimeSlot) -> Self {
        Self {
            id: offering.id.clone(),
            code: offering.code.clone(),
            section: offering.section.clone(),
            name: offering.name.clone(),
            start: slot.start,
            end: slot.end,
        }
    }
}

/// Two offerings that share a weekday with overlapping times.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictPair {
    pub day: Weekday,
    pub first: ConflictSide,
    pub second: ConflictSide,
}

impl fmt::Display for ConflictPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (class {}) {}-{} x {} (class {}) {}-{}",
            self.day,
            self.first.name,
            self.first.section,
            self.first.start.format("%H:%M"),
            self.first.end.format("%H:%M"),
            self.second.name,
            self.second.section,
            self.second.start.format("%H:%M"),
            self.second.end.format("%H:%M"),
        )
    }
}

/// First pair of slots where `a` and `b` collide, in slot order.
pub fn first_collision<'a>(a: &'a Offering, b: &'a Offering) -> Option<(&'a TimeSlot, &'a TimeSlot)> {
    a.slots
        .iter()
        .cartesian_product(b.slots.iter())
        .find(|(sa, sb)| sa.overlaps(sb))
}

pub fn conflicts_with(a: &Offering, b: &Offering) -> bool {
    first_collision(a, b).is_some()
}

/// Reports every clashing pair of offerings, in input order.
pub fn find_conflicts<'a, I>(offerings: I) -> Vec<ConflictPair>
where
    I: IntoIterator<Item = &'a Offering>,
{
    let offerings: Vec<&Offering> = offerings.into_iter().collect();
    offerings
        .into_iter()
        .tuple_combinations()
        .filter_map(|(a, b)| {
            first_collision(a, b).map(|(sa, sb)| ConflictPair {
                day: sa.day,
                first: ConflictSide::new(a, sa),
                second: ConflictSide::new(b, sb),
            })
        })
        .collect()
}

pub fn is_conflict_free<'a, I>(offerings: I) -> bool
where
    I: IntoIterator<Item = &'a Offering>,
{
    let offerings: Vec<&Offering> = offerings.into_iter().collect();
    offerings
        .into_iter()
        .tuple_combinations()
        .all(|(a, b)| !conflicts_with(a, b))
}
