use serde::{Deserialize, Serialize};

/// A single entry within a questionnaire. Questions score a reviewed object
/// either numerically or as a true/false state, depending on their type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub questionnaire_id: i64,
    pub txt: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub seq: f64,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub break_before: bool,
}

/// Question fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub questionnaire_id: i64,
    pub txt: String,
    pub question_type: String,
    pub seq: f64,
    pub weight: Option<i32>,
    pub size: Option<String>,
    pub break_before: bool,
}

impl QuestionDraft {
    /// Field errors, empty when the draft can be saved.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.txt.trim().is_empty() {
            errors.push("Text can't be blank".to_string());
        }
        if self.question_type.trim().is_empty() {
            errors.push("Type can't be blank".to_string());
        }
        if !self.seq.is_finite() {
            errors.push("Seq is not a number".to_string());
        }
        errors
    }

    pub fn into_question(self, id: i64) -> Question {
        Question {
            id,
            questionnaire_id: self.questionnaire_id,
            txt: self.txt,
            question_type: self.question_type,
            seq: self.seq,
            weight: self.weight,
            size: self.size,
            break_before: self.break_before,
        }
    }
}

impl Question {
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            questionnaire_id: self.questionnaire_id,
            txt: self.txt.clone(),
            question_type: self.question_type.clone(),
            seq: self.seq,
            weight: self.weight,
            size: self.size.clone(),
            break_before: self.break_before,
        }
    }
}

/// A submitted review answering some questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i64,
    pub questionnaire_id: i64,
    #[serde(default)]
    pub reviewer_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub late_policy_id: Option<i64>,
}
