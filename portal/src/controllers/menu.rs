use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::auth::Principal;
use crate::nav::{menu_for, NavigationVm};
use crate::{AppResult, AppState};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MenuQuery {
    pub select: Option<String>,
}

/// GET /menu - navigation for the caller as JSON
///
/// An unknown `select` keeps the default landing item selected.
pub async fn show_menu(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<NavigationVm>> {
    debug!("Handling GET /menu: {:?}", query);
    let tree = menu_for(&state, principal.as_ref(), query.select.as_deref())?;
    Ok(Json(NavigationVm::from_tree(&tree)))
}
