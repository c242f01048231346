//! Record store seam
//!
//! Handlers only see [`RecordStore`]; [`MemoryStore`] keeps everything in
//! process and can be seeded from a YAML/JSON document.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use late_policy::LatePolicy;
use menu::MenuItemRecord;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Assignment, Question, QuestionDraft, ReviewResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{entity} {id} is still referenced")]
    InUse { entity: &'static str, id: i64 },

    #[error("Record store unavailable: {message}")]
    Unavailable { message: String },
}

pub trait RecordStore: Send + Sync {
    fn list_questions(&self) -> Result<Vec<Question>, StoreError>;
    fn find_question(&self, id: i64) -> Result<Question, StoreError>;
    fn insert_question(&self, draft: QuestionDraft) -> Result<Question, StoreError>;
    fn update_question(&self, question: &Question) -> Result<(), StoreError>;
    fn delete_question(&self, id: i64) -> Result<Question, StoreError>;
    /// Distinct question types, sorted.
    fn question_types(&self) -> Result<Vec<String>, StoreError>;

    /// Removes every response to the questionnaire and reports how many there were.
    fn delete_responses_for(&self, questionnaire_id: i64) -> Result<usize, StoreError>;

    fn list_late_policies(&self, instructor_id: i64) -> Result<Vec<LatePolicy>, StoreError>;
    fn find_late_policy(&self, id: i64) -> Result<LatePolicy, StoreError>;
    fn policy_name_taken(&self, name: &str, instructor_id: i64) -> Result<bool, StoreError>;
    /// Stores `policy` under a fresh id, ignoring the id it carries.
    fn insert_late_policy(&self, policy: LatePolicy) -> Result<LatePolicy, StoreError>;
    fn update_late_policy(&self, policy: &LatePolicy) -> Result<(), StoreError>;
    fn delete_late_policy(&self, id: i64) -> Result<(), StoreError>;

    /// Menu items ordered by `(parent_id, seq, id)`, top-level items first.
    fn menu_items(&self) -> Result<Vec<MenuItemRecord>, StoreError>;
}

/// Initial store contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub menu_items: Vec<MenuItemRecord>,
    pub questions: Vec<Question>,
    pub responses: Vec<ReviewResponse>,
    pub late_policies: Vec<LatePolicy>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Default)]
struct Tables {
    questions: BTreeMap<i64, Question>,
    responses: BTreeMap<i64, ReviewResponse>,
    late_policies: BTreeMap<i64, LatePolicy>,
    assignments: BTreeMap<i64, Assignment>,
    menu_items: Vec<MenuItemRecord>,
    next_question_id: i64,
    next_policy_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let mut tables = Tables {
            questions: seed.questions.into_iter().map(|q| (q.id, q)).collect(),
            responses: seed.responses.into_iter().map(|r| (r.id, r)).collect(),
            late_policies: seed.late_policies.into_iter().map(|p| (p.id, p)).collect(),
            assignments: seed.assignments.into_iter().map(|a| (a.id, a)).collect(),
            menu_items: seed.menu_items,
            next_question_id: 0,
            next_policy_id: 0,
        };
        tables
            .menu_items
            .sort_by_key(|item| (item.parent_id, item.seq, item.id));
        tables.next_question_id = tables.questions.keys().max().copied().unwrap_or(0);
        tables.next_policy_id = tables.late_policies.keys().max().copied().unwrap_or(0);
        info!(
            "Seeded store: {} menu items, {} questions, {} late policies",
            tables.menu_items.len(),
            tables.questions.len(),
            tables.late_policies.len()
        );
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|e| StoreError::Unavailable {
            message: e.to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|e| StoreError::Unavailable {
            message: e.to_string(),
        })
    }
}

impl RecordStore for MemoryStore {
    fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        Ok(self.read()?.questions.values().cloned().collect())
    }

    fn find_question(&self, id: i64) -> Result<Question, StoreError> {
        self.read()?
            .questions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "Question",
                id,
            })
    }

    fn insert_question(&self, draft: QuestionDraft) -> Result<Question, StoreError> {
        let mut tables = self.write()?;
        tables.next_question_id += 1;
        let question = draft.into_question(tables.next_question_id);
        tables.questions.insert(question.id, question.clone());
        debug!("Inserted question {}", question.id);
        Ok(question)
    }

    fn update_question(&self, question: &Question) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        match tables.questions.get_mut(&question.id) {
            Some(slot) => {
                *slot = question.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "Question",
                id: question.id,
            }),
        }
    }

    fn delete_question(&self, id: i64) -> Result<Question, StoreError> {
        self.write()?
            .questions
            .remove(&id)
            .ok_or(StoreError::NotFound {
                entity: "Question",
                id,
            })
    }

    fn question_types(&self) -> Result<Vec<String>, StoreError> {
        let types: BTreeSet<String> = self
            .read()?
            .questions
            .values()
            .map(|q| q.question_type.clone())
            .collect();
        Ok(types.into_iter().collect())
    }

    fn delete_responses_for(&self, questionnaire_id: i64) -> Result<usize, StoreError> {
        let mut tables = self.write()?;
        let before = tables.responses.len();
        tables
            .responses
            .retain(|_, r| r.questionnaire_id != questionnaire_id);
        Ok(before - tables.responses.len())
    }

    fn list_late_policies(&self, instructor_id: i64) -> Result<Vec<LatePolicy>, StoreError> {
        Ok(self
            .read()?
            .late_policies
            .values()
            .filter(|p| p.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    fn find_late_policy(&self, id: i64) -> Result<LatePolicy, StoreError> {
        self.read()?
            .late_policies
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "Late policy",
                id,
            })
    }

    fn policy_name_taken(&self, name: &str, instructor_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .late_policies
            .values()
            .any(|p| p.instructor_id == instructor_id && p.policy_name == name))
    }

    fn insert_late_policy(&self, mut policy: LatePolicy) -> Result<LatePolicy, StoreError> {
        let mut tables = self.write()?;
        let clash = tables.late_policies.values().any(|p| {
            p.instructor_id == policy.instructor_id && p.policy_name == policy.policy_name
        });
        if clash {
            return Err(StoreError::Conflict {
                message: format!("policy name {} is already taken", policy.policy_name),
            });
        }
        tables.next_policy_id += 1;
        policy.id = tables.next_policy_id;
        tables.late_policies.insert(policy.id, policy.clone());
        debug!("Inserted late policy {}", policy.id);
        Ok(policy)
    }

    fn update_late_policy(&self, policy: &LatePolicy) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let clash = tables.late_policies.values().any(|p| {
            p.id != policy.id
                && p.instructor_id == policy.instructor_id
                && p.policy_name == policy.policy_name
        });
        if clash {
            return Err(StoreError::Conflict {
                message: format!("policy name {} is already taken", policy.policy_name),
            });
        }
        match tables.late_policies.get_mut(&policy.id) {
            Some(slot) => {
                *slot = policy.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "Late policy",
                id: policy.id,
            }),
        }
    }

    fn delete_late_policy(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.late_policies.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "Late policy",
                id,
            });
        }
        let in_use: HashSet<i64> = tables
            .assignments
            .values()
            .filter_map(|a| a.late_policy_id)
            .collect();
        if in_use.contains(&id) {
            return Err(StoreError::InUse {
                entity: "Late policy",
                id,
            });
        }
        tables.late_policies.remove(&id);
        Ok(())
    }

    fn menu_items(&self) -> Result<Vec<MenuItemRecord>, StoreError> {
        Ok(self.read()?.menu_items.clone())
    }
}
