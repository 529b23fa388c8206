use serde::Serialize;
use thiserror::Error;

use crate::conflict::ConflictPair;

/// A slot specification that could not be turned into time slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown day code `{code}` in `{fragment}`")]
    UnknownDay { code: String, fragment: String },

    #[error("expected `<DAY> - <HH:MM> às <HH:MM>`, got `{fragment}`")]
    Malformed { fragment: String },

    #[error("invalid time `{value}` in `{fragment}`")]
    InvalidTime { value: String, fragment: String },

    #[error("slot must end after it starts: `{fragment}`")]
    EmptyInterval { fragment: String },
}

/// A scenario whose required offerings can never be scheduled together.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ScenarioError {
    #[error("scenario `{label}` requires offerings that overlap ({} conflict(s))", .conflicts.len())]
    ConflictingRequired {
        label: String,
        required: Vec<String>,
        conflicts: Vec<ConflictPair>,
    },
}

impl ScenarioError {
    pub fn label(&self) -> &str {
        match self {
            ScenarioError::ConflictingRequired { label, .. } => label,
        }
    }

    pub fn required(&self) -> &[String] {
        match self {
            ScenarioError::ConflictingRequired { required, .. } => required,
        }
    }
}

/// Rejected request-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("exploration cap must be positive")]
    ZeroCap,

    #[error("target day count {0} exceeds the 7 days of the week")]
    TooManyDays(usize),
}
