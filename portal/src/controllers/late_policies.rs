use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use late_policy::{validate, Intent, LatePolicy, PenaltyUnit, PolicyForm};
use tracing::{error, info, warn};

use crate::auth::Principal;
use crate::flash::{self, Flash};
use crate::params::PolicyParams;
use crate::store::StoreError;
use crate::views::{render, Page};
use crate::{AppError, AppResult, AppState};

const MENU: &str = "late_policies";
const INDEX: &str = "/late_policies";

fn unit_names() -> Vec<&'static str> {
    PenaltyUnit::ALL.iter().map(|u| u.as_str()).collect()
}

/// Loads a policy the caller may manage: its owner, or an administrator.
fn owned_policy(state: &AppState, principal: &Principal, id: i64) -> AppResult<LatePolicy> {
    let policy = state.store.find_late_policy(id)?;
    if policy.instructor_id != principal.user_id && !principal.role.is_admin() {
        warn!(
            "{} tried to access late policy {} owned by {}",
            principal.login, id, policy.instructor_id
        );
        return Err(AppError::forbidden());
    }
    Ok(policy)
}

/// Runs validation, surfacing a store failure from the name lookup as an error.
fn check_form(
    state: &AppState,
    instructor_id: i64,
    form: &PolicyForm,
    intent: Intent<'_>,
) -> AppResult<Result<(), String>> {
    let mut lookup_error: Option<StoreError> = None;
    let outcome = validate(form, intent, |name| {
        match state.store.policy_name_taken(name, instructor_id) {
            Ok(taken) => taken,
            Err(e) => {
                lookup_error = Some(e);
                false
            }
        }
    });
    if let Some(e) = lookup_error {
        return Err(e.into());
    }
    Ok(outcome.map_err(|failure| failure.to_string()))
}

fn form_page(title: &str, policy_id: Option<i64>, form: &PolicyForm) -> Page<'static> {
    Page::new("late_policies/form.html", MENU, title)
        .insert("policy_id", &policy_id)
        .insert("form", form)
        .insert("units", &unit_names())
}

/// GET /late_policies - the caller's own policies
pub async fn index(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let policies = state.store.list_late_policies(principal.user_id)?;
    let page = Page::new("late_policies/index.html", MENU, "Late policies")
        .insert("policies", &policies);
    render(&state, Some(&principal), &headers, page)
}

/// GET /late_policies/:id
pub async fn show(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let policy = owned_policy(&state, &principal, id)?;
    let page = Page::new("late_policies/show.html", MENU, policy.policy_name.clone())
        .insert("policy", &policy);
    render(&state, Some(&principal), &headers, page)
}

/// GET /late_policies/new
pub async fn new(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let page = form_page("New late policy", None, &PolicyForm::default());
    render(&state, Some(&principal), &headers, page)
}

/// POST /late_policies
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Form(params): Form<PolicyParams>,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let form = params.to_form();

    if let Err(message) = check_form(&state, principal.user_id, &form, Intent::Create)? {
        warn!("Rejected new late policy from {}: {}", principal.login, message);
        return Ok(flash::redirect_with("/late_policies/new", Flash::error(message)));
    }

    let policy = LatePolicy::from_form(0, principal.user_id, &form);
    match state.store.insert_late_policy(policy) {
        Ok(saved) => {
            info!("{} created late policy {}", principal.login, saved.id);
            Ok(flash::redirect_with(
                INDEX,
                Flash::success("The late policy was successfully created."),
            ))
        }
        Err(e) => {
            error!("Failed to save late policy: {}", e);
            Ok(flash::redirect_with(
                "/late_policies/new",
                Flash::error(format!(
                    "The following error occurred while saving the late policy: {}",
                    e
                )),
            ))
        }
    }
}

/// GET /late_policies/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let policy = owned_policy(&state, &principal, id)?;
    let page = form_page("Edit late policy", Some(id), &policy.to_form());
    render(&state, Some(&principal), &headers, page)
}

/// POST /late_policies/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Form(params): Form<PolicyParams>,
) -> AppResult<Response> {
    principal.require_instructor()?;
    let mut policy = owned_policy(&state, &principal, id)?;
    let form = params.to_form();
    let edit_path = format!("/late_policies/{}/edit", id);

    let intent = Intent::Update { current: &policy };
    if let Err(message) = check_form(&state, policy.instructor_id, &form, intent)? {
        warn!("Rejected update of late policy {}: {}", id, message);
        return Ok(flash::redirect_with(&edit_path, Flash::error(message)));
    }

    policy.apply(&form);
    match state.store.update_late_policy(&policy) {
        Ok(()) => {
            info!("{} updated late policy {}", principal.login, id);
            Ok(flash::redirect_with(
                INDEX,
                Flash::success("The late policy was successfully updated."),
            ))
        }
        Err(e) => {
            error!("Failed to update late policy {}: {}", id, e);
            Ok(flash::redirect_with(
                &edit_path,
                Flash::error(format!(
                    "The following error occurred while updating the late policy: {}",
                    e
                )),
            ))
        }
    }
}

/// POST /late_policies/:id/delete
pub async fn destroy(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    principal.require_instructor()?;
    owned_policy(&state, &principal, id)?;

    match state.store.delete_late_policy(id) {
        Ok(()) => {
            info!("{} deleted late policy {}", principal.login, id);
            Ok(Redirect::to(INDEX).into_response())
        }
        Err(e) => {
            warn!("Late policy {} not deleted: {}", id, e);
            Ok(flash::redirect_with(
                INDEX,
                Flash::error("This policy is in use and hence cannot be deleted."),
            ))
        }
    }
}

/// GET /late_policies/:id/delete
pub async fn redirect_to_index() -> Redirect {
    Redirect::to(INDEX)
}
