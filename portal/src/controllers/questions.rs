//! Question screens. Every action requires TA privileges.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::auth::Principal;
use crate::flash::{self, Flash, FlashLevel};
use crate::model::{Question, QuestionDraft};
use crate::params::{bracket_key, lenient_int, QuestionParams};
use crate::views::{render, Page};
use crate::{AppResult, AppState};

const MENU: &str = "questions";
const QUIZ_QUESTIONNAIRE: &str = "QuizQuestionnaire";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
struct QuestionFormVm {
    questionnaire_id: String,
    txt: String,
    question_type: String,
    seq: String,
    weight: String,
    size: String,
    break_before: bool,
}

impl From<&QuestionParams> for QuestionFormVm {
    fn from(params: &QuestionParams) -> Self {
        Self {
            questionnaire_id: params.questionnaire_id.clone(),
            txt: params.txt.clone(),
            question_type: params.question_type.clone(),
            seq: params.seq.clone(),
            weight: params.weight.clone(),
            size: params.size.clone(),
            break_before: params.to_draft().break_before,
        }
    }
}

impl From<&Question> for QuestionFormVm {
    fn from(question: &Question) -> Self {
        Self {
            questionnaire_id: question.questionnaire_id.to_string(),
            txt: question.txt.clone(),
            question_type: question.question_type.clone(),
            seq: question.seq.to_string(),
            weight: question.weight.map(|w| w.to_string()).unwrap_or_default(),
            size: question.size.clone().unwrap_or_default(),
            break_before: question.break_before,
        }
    }
}

fn form_page(
    title: &str,
    question_id: Option<i64>,
    form: QuestionFormVm,
    errors: Vec<String>,
) -> Page<'static> {
    Page::new("questions/form.html", MENU, title)
        .insert("question_id", &question_id)
        .insert("form", &form)
        .insert("errors", &errors)
}

/// GET /questions - default action, same as list
pub async fn index(
    state: State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    query: Query<ListQuery>,
) -> AppResult<Response> {
    list(state, principal, headers, query).await
}

/// GET /questions/list - one page of questions
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    principal.require_ta()?;
    let requested = query.page.as_deref().map(lenient_int).unwrap_or(1).max(1);
    debug!("Handling questions list, page {}", requested);

    let questions = state.store.list_questions()?;
    let total_pages = questions.len().div_ceil(state.page_size).max(1);
    // Pages past the end show the last page.
    let current = usize::try_from(requested).unwrap_or(usize::MAX).min(total_pages);
    let rows: Vec<Question> = questions
        .into_iter()
        .skip((current - 1) * state.page_size)
        .take(state.page_size)
        .collect();

    let page = Page::new("questions/list.html", MENU, "Questions")
        .insert("questions", &rows)
        .insert("page", &current)
        .insert("total_pages", &total_pages);
    render(&state, Some(&principal), &headers, page)
}

/// GET /questions/:id
pub async fn show(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_ta()?;
    let question = state.store.find_question(id)?;
    let page = Page::new("questions/show.html", MENU, format!("Question {}", id))
        .insert("question", &question);
    render(&state, Some(&principal), &headers, page)
}

/// GET /questions/new
pub async fn new(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
) -> AppResult<Response> {
    principal.require_ta()?;
    let page = form_page("New question", None, QuestionFormVm::default(), Vec::new());
    render(&state, Some(&principal), &headers, page)
}

/// POST /questions - save a question created through the new form
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Form(params): Form<QuestionParams>,
) -> AppResult<Response> {
    principal.require_ta()?;
    let draft = params.to_draft();
    let errors = draft.errors();
    if !errors.is_empty() {
        warn!("Rejected new question: {:?}", errors);
        let page = form_page("New question", None, QuestionFormVm::from(&params), errors)
            .status(StatusCode::UNPROCESSABLE_ENTITY);
        return render(&state, Some(&principal), &headers, page);
    }

    let question = state.store.insert_question(draft)?;
    info!("{} created question {}", principal.login, question.id);
    Ok(flash::redirect_with(
        "/questions",
        Flash::notice("The question was successfully created."),
    ))
}

/// GET /questions/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_ta()?;
    let question = state.store.find_question(id)?;
    let page = form_page(
        "Edit question",
        Some(id),
        QuestionFormVm::from(&question),
        Vec::new(),
    );
    render(&state, Some(&principal), &headers, page)
}

/// POST /questions/:id - save the edit form
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(params): Form<QuestionParams>,
) -> AppResult<Response> {
    principal.require_ta()?;
    state.store.find_question(id)?;

    let draft = params.to_draft();
    let errors = draft.errors();
    if !errors.is_empty() {
        warn!("Rejected update of question {}: {:?}", id, errors);
        let page = form_page("Edit question", Some(id), QuestionFormVm::from(&params), errors)
            .status(StatusCode::UNPROCESSABLE_ENTITY);
        return render(&state, Some(&principal), &headers, page);
    }

    state.store.update_question(&draft.into_question(id))?;
    info!("{} updated question {}", principal.login, id);
    Ok(flash::redirect_with(
        &format!("/questions/{}", id),
        Flash::notice("The question was successfully updated."),
    ))
}

/// POST /questions/:id/delete - remove the question, dropping any reviews of
/// its questionnaire, and return to the questionnaire editor
pub async fn destroy(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_ta()?;
    let question = state.store.find_question(id)?;
    let questionnaire_id = question.questionnaire_id;

    let deleted_responses = state.store.delete_responses_for(questionnaire_id)?;
    let mut flash = if deleted_responses > 0 {
        Flash::success(
            "You have successfully deleted the question. Any existing reviews for the questionnaire have been deleted!",
        )
    } else {
        Flash::success("You have successfully deleted the question!")
    };

    match state.store.delete_question(id) {
        Ok(_) => info!(
            "{} deleted question {} ({} responses dropped)",
            principal.login, id, deleted_responses
        ),
        Err(e) => {
            error!("Failed to delete question {}: {}", id, e);
            flash = flash.with(FlashLevel::Error, e.to_string());
        }
    }

    Ok(flash::redirect_with(
        &format!("/questionnaires/{}/edit", questionnaire_id),
        flash,
    ))
}

/// GET /questions/:id/delete
pub async fn redirect_to_list() -> Redirect {
    Redirect::to("/questions")
}

/// GET /questions/types - distinct question types, used for answer tagging
pub async fn types(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<String>>> {
    principal.require_ta()?;
    Ok(Json(state.store.question_types()?))
}

/// POST /questionnaires/:questionnaire_id/questions - save the questions
/// added to a questionnaire in one submission
///
/// Fields: `new_question[<seq>]` text, `question_type[<seq>][type]`,
/// `questionnaire_type`, and for quizzes `question_weights[question_<n>]`
/// where `n` counts new questions from 1.
pub async fn save_new_questions(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(questionnaire_id): Path<i64>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    principal.require_ta()?;

    let mut new_questions: Vec<(String, String)> = Vec::new();
    let mut types: HashMap<String, String> = HashMap::new();
    let mut weights: HashMap<String, String> = HashMap::new();
    let mut questionnaire_type = String::new();

    for (name, value) in &fields {
        if name == "questionnaire_type" {
            questionnaire_type = value.clone();
            continue;
        }
        match bracket_key(name) {
            Some(("new_question", key)) => {
                if !new_questions.iter().any(|(k, _)| k == key) {
                    new_questions.push((key.to_string(), value.clone()));
                }
            }
            Some(("question_type", rest)) => {
                if let Some((key, "type")) = rest.split_once("][") {
                    types.insert(key.to_string(), value.clone());
                }
            }
            Some(("question_weights", key)) => {
                weights.insert(key.to_string(), value.clone());
            }
            _ => {}
        }
    }

    let is_quiz = questionnaire_type == QUIZ_QUESTIONNAIRE;
    let mut saved = 0;
    for (index, (key, txt)) in new_questions.iter().enumerate() {
        let weight = if is_quiz {
            weights
                .get(&format!("question_{}", index + 1))
                .and_then(|w| w.trim().parse().ok())
        } else {
            None
        };
        let draft = QuestionDraft {
            questionnaire_id,
            txt: txt.clone(),
            question_type: types.get(key).cloned().unwrap_or_default(),
            seq: lenient_int(key) as f64,
            weight,
            size: None,
            break_before: true,
        };
        let errors = draft.errors();
        if !errors.is_empty() {
            debug!("Skipping new question {}: {:?}", key, errors);
            continue;
        }
        state.store.insert_question(draft)?;
        saved += 1;
    }
    info!(
        "{} added {} questions to questionnaire {}",
        principal.login, saved, questionnaire_id
    );

    let fallback = format!("/questionnaires/{}/edit", questionnaire_id);
    Ok(Redirect::to(&referer_path(&headers).unwrap_or(fallback)).into_response())
}

// Only the path of the referring page is reused so the redirect stays on this host.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let uri: Uri = headers.get(header::REFERER)?.to_str().ok()?.parse().ok()?;
    let path = uri.path_and_query()?.as_str();
    path.starts_with('/').then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn referer_keeps_only_path_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://evil.example/questionnaires/4/edit?tab=2"),
        );
        assert_eq!(
            referer_path(&headers).as_deref(),
            Some("/questionnaires/4/edit?tab=2")
        );
    }

    #[test]
    fn missing_referer_is_none() {
        assert_eq!(referer_path(&HeaderMap::new()), None);
    }
}
