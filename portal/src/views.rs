use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tera::{Context, Tera};
use tracing::error;

use crate::auth::Principal;
use crate::flash::{self, Flash, FLASH_COOKIE};
use crate::nav::{menu_for, NavigationVm};
use crate::{AppError, AppResult, AppState};

/// Loads the page templates shipped with the crate.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let tpl_glob = format!("{}/templates/**/*.html", env!("CARGO_MANIFEST_DIR"));
    Tera::new(&tpl_glob)
}

/// A full HTML page: `template` rendered inside the layout with the
/// caller's navigation, selected on `menu`.
pub struct Page<'a> {
    pub template: &'a str,
    pub menu: &'a str,
    pub title: String,
    pub context: Context,
    pub status: StatusCode,
}

impl<'a> Page<'a> {
    pub fn new(template: &'a str, menu: &'a str, title: impl Into<String>) -> Self {
        Self {
            template,
            menu,
            title: title.into(),
            context: Context::new(),
            status: StatusCode::OK,
        }
    }

    pub fn insert<T: serde::Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Renders `page`, consuming any pending flash from the request cookies.
pub fn render(
    state: &AppState,
    principal: Option<&Principal>,
    headers: &HeaderMap,
    page: Page<'_>,
) -> AppResult<Response> {
    let tree = menu_for(state, principal, Some(page.menu))?;
    let jar = CookieJar::from_headers(headers);
    let flash = Flash::from_jar(&jar);

    let mut context = page.context;
    context.insert("title", &page.title);
    context.insert("nav", &NavigationVm::from_tree(&tree));
    context.insert("flash", &flash.unwrap_or_default().messages);
    context.insert("user", &principal.map(|p| p.login.as_str()));

    let html = state.tera.render(page.template, &context).map_err(|e| {
        error!("Template rendering failed for {}: {}", page.template, e);
        AppError::from(e)
    })?;

    let response = (page.status, Html(html));
    if jar.get(FLASH_COOKIE).is_some() {
        return Ok((flash::consume(jar), response).into_response());
    }
    Ok(response.into_response())
}
