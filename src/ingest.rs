//! Normalizes loosely-typed timetable rows into [`Offering`] records.
//!
//! A row whose schedule cannot be parsed, or that has no schedule at all,
//! is dropped with a warning; the remaining rows still load.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Offering, OfferingId};
use crate::error::ParseError;
use crate::time::parse_slots;

/// One exported timetable row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingRow {
    #[serde(default)]
    pub id: Option<OfferingId>,
    pub code: String,
    pub section: String,
    pub name: String,
    #[serde(default)]
    pub program: Option<String>,
    /// Slot specifications, e.g. one per "day" column.
    #[serde(default)]
    pub schedule: Vec<String>,
}

impl OfferingRow {
    /// Explicit id, or `code-section-<schedule...>`.
    pub fn row_id(&self) -> OfferingId {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => {
                let mut parts = vec![self.code.as_str(), self.section.as_str()];
                parts.extend(self.schedule.iter().map(String::as_str));
                parts.join("-")
            }
        }
    }

    pub fn to_offering(&self) -> Result<Offering, ParseError> {
        let mut slots = Vec::new();
        for spec in &self.schedule {
            slots.extend(parse_slots(spec)?);
        }
        let offering = Offering::new(self.row_id(), &self.code, &self.section, &self.name).with_slots(slots);
        Ok(match &self.program {
            Some(program) => offering.with_program(program),
            None => offering,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowWarning {
    pub row_id: OfferingId,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalized {
    pub offerings: Vec<Offering>,
    pub warnings: Vec<RowWarning>,
}

pub fn normalize_rows(rows: &[OfferingRow]) -> Normalized {
    let mut normalized = Normalized::default();
    for row in rows {
        match row.to_offering() {
            Ok(offering) if offering.slots.is_empty() => {
                warn!("Row {} has no schedule; skipping.", offering.id);
                normalized.warnings.push(RowWarning {
                    row_id: offering.id,
                    message: "no schedule".to_string(),
                });
            }
            Ok(offering) => normalized.offerings.push(offering),
            Err(e) => {
                let row_id = row.row_id();
                warn!("Row {row_id}: {e}");
                normalized.warnings.push(RowWarning {
                    row_id,
                    message: e.to_string(),
                });
            }
        }
    }
    debug!(
        "Normalized {} of {} rows ({} warnings).",
        normalized.offerings.len(),
        rows.len(),
        normalized.warnings.len()
    );
    normalized
}
