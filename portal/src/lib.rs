//! Peer-review portal web layer
//!
//! Serves the questions and late-policy screens plus the role-scoped
//! navigation menu on top of a pluggable record store.

pub mod auth;
pub mod config;
pub mod controllers;
pub mod flash;
pub mod model;
pub mod nav;
pub mod params;
pub mod store;
pub mod views;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tera::Tera;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::error;

use crate::auth::JwtConfig;
use crate::controllers::{late_policies, menu as menu_routes, questions};
use crate::store::{RecordStore, StoreError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub tera: Tera,
    pub jwt_config: JwtConfig,
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        jwt_config: JwtConfig,
        page_size: usize,
    ) -> Result<Self, AppError> {
        let tera = views::load_templates().map_err(|e| {
            error!("Parsing error for Tera templates: {}", e);
            AppError::from(e)
        })?;
        Ok(Self {
            store,
            tera,
            jwt_config,
            page_size: page_size.max(1),
        })
    }
}

/// Custom error type for handler responses
#[derive(Debug)]
pub struct AppError {
    pub status_code: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "You are not authorized to perform this action",
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal server error: {}", err),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Template rendering error: {}", err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status_code = match err {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Conflict { .. } | StoreError::InUse { .. } => StatusCode::CONFLICT,
            StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        AppError {
            status_code,
            message: err.to_string(),
        }
    }
}

impl From<::menu::MenuError> for AppError {
    fn from(err: ::menu::MenuError) -> Self {
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Menu configuration error: {}", err),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code, self.message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Health check endpoint
async fn health() -> impl IntoResponse {
    "OK"
}

// Fallback handler for 404s
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(
            r#"
<!DOCTYPE html>
<html>
<head>
    <title>404 - Not Found</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .error { color: #d32f2f; }
    </style>
</head>
<body>
    <h1 class="error">404 - Page Not Found</h1>
    <p><a href="/questions">&larr; Back to Questions</a></p>
</body>
</html>
    "#,
        ),
    )
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/menu", get(menu_routes::show_menu))
        // Questions
        .route(
            "/questions",
            get(questions::index).post(questions::create),
        )
        .route("/questions/list", get(questions::list))
        .route("/questions/new", get(questions::new))
        .route("/questions/types", get(questions::types))
        .route(
            "/questions/:id",
            get(questions::show).post(questions::update),
        )
        .route("/questions/:id/edit", get(questions::edit))
        // GETs must stay safe: a non-POST delete bounces back to the list.
        .route(
            "/questions/:id/delete",
            post(questions::destroy).get(questions::redirect_to_list),
        )
        .route(
            "/questionnaires/:questionnaire_id/questions",
            post(questions::save_new_questions),
        )
        // Late policies
        .route(
            "/late_policies",
            get(late_policies::index).post(late_policies::create),
        )
        .route("/late_policies/new", get(late_policies::new))
        .route(
            "/late_policies/:id",
            get(late_policies::show).post(late_policies::update),
        )
        .route("/late_policies/:id/edit", get(late_policies::edit))
        .route(
            "/late_policies/:id/delete",
            post(late_policies::destroy).get(late_policies::redirect_to_index),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_middleware,
        ))
        // Avoid logging request headers so Authorization tokens never reach logs.
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}
