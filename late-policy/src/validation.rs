use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LatePolicy, PenaltyUnit};

pub const MAX_PENALTY: i32 = 100;

const UPDATE_PREFIX: &str = "Cannot edit the policy. ";

/// Values submitted through the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyForm {
    pub policy_name: String,
    pub max_penalty: i32,
    pub penalty_per_unit: i32,
    #[serde(default)]
    pub penalty_unit: PenaltyUnit,
}

#[derive(Debug, Clone, Copy)]
pub enum Intent<'a> {
    Create,
    /// Editing `current`; the name is only re-checked when it changes.
    Update { current: &'a LatePolicy },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("The maximum penalty must be between the penalty per unit and 100.")]
    PenaltyRange,

    #[error("Penalty per unit cannot be negative.")]
    NegativePenaltyPerUnit,

    #[error("A policy with the same name {name} already exists.")]
    DuplicateName { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub update: bool,
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            if self.update {
                f.write_str(UPDATE_PREFIX)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Checks a submitted form. `name_taken` answers whether the instructor
/// already owns a policy with the given name.
pub fn validate<F>(
    form: &PolicyForm,
    intent: Intent<'_>,
    name_taken: F,
) -> Result<(), ValidationFailure>
where
    F: FnOnce(&str) -> bool,
{
    let mut violations = Vec::new();

    if form.max_penalty < form.penalty_per_unit || form.max_penalty > MAX_PENALTY {
        violations.push(Violation::PenaltyRange);
    }
    if form.penalty_per_unit < 0 {
        violations.push(Violation::NegativePenaltyPerUnit);
    }

    let name = form.policy_name.trim();
    let check_name = match intent {
        Intent::Create => true,
        Intent::Update { current } => current.policy_name != name,
    };
    if check_name && name_taken(name) {
        violations.push(Violation::DuplicateName {
            name: name.to_string(),
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            update: matches!(intent, Intent::Update { .. }),
            violations,
        })
    }
}
