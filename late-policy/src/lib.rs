//! Late-submission penalty policies: the policy model, the rules a policy
//! form must satisfy, and the penalty a late submission incurs.

pub mod penalty;
pub mod validation;

pub use penalty::PenaltyUnit;
pub use validation::{validate, Intent, PolicyForm, ValidationFailure, Violation, MAX_PENALTY};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatePolicy {
    pub id: i64,
    pub policy_name: String,
    pub instructor_id: i64,
    pub max_penalty: i32,
    pub penalty_per_unit: i32,
    #[serde(default)]
    pub penalty_unit: PenaltyUnit,
}

impl LatePolicy {
    pub fn from_form(id: i64, instructor_id: i64, form: &PolicyForm) -> Self {
        Self {
            id,
            policy_name: form.policy_name.trim().to_string(),
            instructor_id,
            max_penalty: form.max_penalty,
            penalty_per_unit: form.penalty_per_unit,
            penalty_unit: form.penalty_unit,
        }
    }

    pub fn apply(&mut self, form: &PolicyForm) {
        self.policy_name = form.policy_name.trim().to_string();
        self.max_penalty = form.max_penalty;
        self.penalty_per_unit = form.penalty_per_unit;
        self.penalty_unit = form.penalty_unit;
    }

    pub fn to_form(&self) -> PolicyForm {
        PolicyForm {
            policy_name: self.policy_name.clone(),
            max_penalty: self.max_penalty,
            penalty_per_unit: self.penalty_per_unit,
            penalty_unit: self.penalty_unit,
        }
    }
}
