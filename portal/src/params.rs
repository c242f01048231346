//! Form parameter coercion.
//!
//! Browsers send every field as text, blanks included, so forms bind to
//! strings and are converted here.

use late_policy::{PenaltyUnit, PolicyForm};
use serde::Deserialize;

use crate::model::QuestionDraft;

/// Integer prefix of `raw` (optional sign, then digits); anything else is 0.
pub fn lenient_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

fn lenient_i32(raw: &str) -> i32 {
    lenient_int(raw).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    pub policy_name: String,
    pub max_penalty: String,
    pub penalty_per_unit: String,
    pub penalty_unit: String,
}

impl PolicyParams {
    pub fn to_form(&self) -> PolicyForm {
        PolicyForm {
            policy_name: self.policy_name.trim().to_string(),
            max_penalty: lenient_i32(&self.max_penalty),
            penalty_per_unit: lenient_i32(&self.penalty_per_unit),
            penalty_unit: self.penalty_unit.parse().unwrap_or(PenaltyUnit::Minute),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuestionParams {
    pub questionnaire_id: String,
    pub txt: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub seq: String,
    pub weight: String,
    pub size: String,
    pub break_before: Option<String>,
}

impl QuestionParams {
    /// A blank or non-numeric `seq` becomes NaN and fails draft validation.
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            questionnaire_id: lenient_int(&self.questionnaire_id),
            txt: self.txt.trim().to_string(),
            question_type: self.question_type.trim().to_string(),
            seq: self.seq.trim().parse::<f64>().unwrap_or(f64::NAN),
            weight: self.weight.trim().parse().ok(),
            size: optional(&self.size),
            break_before: self
                .break_before
                .as_deref()
                .is_some_and(|v| matches!(v, "1" | "true" | "on")),
        }
    }
}

/// Splits `outer[inner]` into `("outer", "inner")`.
pub fn bracket_key(key: &str) -> Option<(&str, &str)> {
    let (outer, rest) = key.split_once('[')?;
    let inner = rest.strip_suffix(']')?;
    Some((outer, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_int_reads_leading_digits() {
        assert_eq!(lenient_int("42"), 42);
        assert_eq!(lenient_int("  -10"), -10);
        assert_eq!(lenient_int("30abc"), 30);
        assert_eq!(lenient_int("abc"), 0);
        assert_eq!(lenient_int(""), 0);
        assert_eq!(lenient_int("-"), 0);
    }

    #[test]
    fn policy_params_coerce_like_a_browser_form() {
        let params = PolicyParams {
            policy_name: " Policy1 ".into(),
            max_penalty: "40".into(),
            penalty_per_unit: "".into(),
            penalty_unit: "Hour".into(),
        };
        let form = params.to_form();
        assert_eq!(form.policy_name, "Policy1");
        assert_eq!(form.max_penalty, 40);
        assert_eq!(form.penalty_per_unit, 0);
        assert_eq!(form.penalty_unit, PenaltyUnit::Hour);
    }

    #[test]
    fn question_params_blank_seq_is_invalid() {
        let params = QuestionParams {
            questionnaire_id: "2".into(),
            txt: "Clarity".into(),
            question_type: "Criterion".into(),
            ..QuestionParams::default()
        };
        let draft = params.to_draft();
        assert_eq!(draft.errors(), vec!["Seq is not a number"]);
        assert_eq!(draft.weight, None);
        assert!(!draft.break_before);
    }

    #[test]
    fn bracket_keys_split() {
        assert_eq!(bracket_key("new_question[3]"), Some(("new_question", "3")));
        assert_eq!(
            bracket_key("question_type[3][type]"),
            Some(("question_type", "3][type"))
        );
        assert_eq!(bracket_key("questionnaire_type"), None);
    }
}
