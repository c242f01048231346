#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::Response,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use late_policy::{LatePolicy, PenaltyUnit};
use menu::{ContentPageRef, ControllerActionRef, MenuItemRecord, MenuTarget};
use portal::auth::{Claims, JwtConfig, Role};
use portal::flash::Flash;
use portal::model::{Assignment, Question, QuestionDraft, ReviewResponse};
use portal::store::{MemoryStore, RecordStore, SeedData, StoreError};
use portal::{create_app, AppState};
use tower::ServiceExt;

pub const SECRET: &str = "portal-test-secret";
pub const MANAGE_PERMISSION: i64 = 5;
pub const POLICY_PERMISSION: i64 = 6;

pub const INSTRUCTOR_ID: i64 = 6;
pub const TA_ID: i64 = 7;
pub const OTHER_INSTRUCTOR_ID: i64 = 9;

fn action(
    id: i64,
    parent_id: Option<i64>,
    name: &str,
    label: &str,
    seq: i32,
    url: Option<&str>,
    permission_id: i64,
) -> MenuItemRecord {
    MenuItemRecord {
        id,
        parent_id,
        name: name.to_string(),
        label: label.to_string(),
        seq,
        target: MenuTarget::ControllerAction(ControllerActionRef {
            id: 10 + id,
            site_controller_id: id,
            controller_name: name.to_string(),
            action_name: "list".to_string(),
            url_to_use: url.map(str::to_string),
            permission_id: Some(permission_id),
        }),
    }
}

fn content(id: i64, name: &str, label: &str, seq: i32) -> MenuItemRecord {
    MenuItemRecord {
        id,
        parent_id: None,
        name: name.to_string(),
        label: label.to_string(),
        seq,
        target: MenuTarget::ContentPage(ContentPageRef {
            id,
            name: name.to_string(),
            permission_id: None,
        }),
    }
}

fn question(id: i64, questionnaire_id: i64, txt: &str, question_type: &str, seq: f64) -> Question {
    Question {
        id,
        questionnaire_id,
        txt: txt.to_string(),
        question_type: question_type.to_string(),
        seq,
        weight: Some(1),
        size: None,
        break_before: true,
    }
}

fn policy(id: i64, name: &str, instructor_id: i64) -> LatePolicy {
    LatePolicy {
        id,
        policy_name: name.to_string(),
        instructor_id,
        max_penalty: 50,
        penalty_per_unit: 10,
        penalty_unit: PenaltyUnit::Day,
    }
}

/// Menu: Home, Manage... (Questions, Late policies), Contact Us.
/// Questions 1 and 2 belong to questionnaire 1, which has one review;
/// question 3 belongs to questionnaire 2. Policy 1 is used by an assignment.
pub fn seed() -> SeedData {
    SeedData {
        menu_items: vec![
            content(1, "home", "Home", 1),
            action(2, None, "manage", "Manage...", 2, None, MANAGE_PERMISSION),
            action(3, Some(2), "questions", "Questions", 1, Some("/questions"), MANAGE_PERMISSION),
            action(
                4,
                Some(2),
                "late_policies",
                "Late policies",
                2,
                Some("/late_policies"),
                POLICY_PERMISSION,
            ),
            content(5, "contact_us", "Contact Us", 3),
        ],
        questions: vec![
            question(1, 1, "How clear was the write-up?", "Criterion", 1.0),
            question(2, 1, "Did the submission include tests?", "Checkbox", 2.0),
            question(3, 2, "Was the demo convincing?", "Criterion", 1.0),
        ],
        responses: vec![ReviewResponse {
            id: 1,
            questionnaire_id: 1,
            reviewer_id: Some(TA_ID),
        }],
        late_policies: vec![
            policy(1, "Standard", INSTRUCTOR_ID),
            policy(2, "Lenient", INSTRUCTOR_ID),
            policy(3, "Strict", OTHER_INSTRUCTOR_ID),
        ],
        assignments: vec![Assignment {
            id: 1,
            name: "Program 1".to_string(),
            late_policy_id: Some(1),
        }],
    }
}

pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_seed(seed()))
}

/// Seeded store whose selected writes fail with `disk full`.
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_policy_writes: bool,
    pub fail_question_delete: bool,
}

impl FaultyStore {
    pub fn seeded() -> Self {
        Self {
            inner: MemoryStore::from_seed(seed()),
            fail_policy_writes: false,
            fail_question_delete: false,
        }
    }
}

fn disk_full() -> StoreError {
    StoreError::Unavailable {
        message: "disk full".to_string(),
    }
}

impl RecordStore for FaultyStore {
    fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        self.inner.list_questions()
    }
    fn find_question(&self, id: i64) -> Result<Question, StoreError> {
        self.inner.find_question(id)
    }
    fn insert_question(&self, draft: QuestionDraft) -> Result<Question, StoreError> {
        self.inner.insert_question(draft)
    }
    fn update_question(&self, question: &Question) -> Result<(), StoreError> {
        self.inner.update_question(question)
    }
    fn delete_question(&self, id: i64) -> Result<Question, StoreError> {
        if self.fail_question_delete {
            return Err(disk_full());
        }
        self.inner.delete_question(id)
    }
    fn question_types(&self) -> Result<Vec<String>, StoreError> {
        self.inner.question_types()
    }
    fn delete_responses_for(&self, questionnaire_id: i64) -> Result<usize, StoreError> {
        self.inner.delete_responses_for(questionnaire_id)
    }
    fn list_late_policies(&self, instructor_id: i64) -> Result<Vec<LatePolicy>, StoreError> {
        self.inner.list_late_policies(instructor_id)
    }
    fn find_late_policy(&self, id: i64) -> Result<LatePolicy, StoreError> {
        self.inner.find_late_policy(id)
    }
    fn policy_name_taken(&self, name: &str, instructor_id: i64) -> Result<bool, StoreError> {
        self.inner.policy_name_taken(name, instructor_id)
    }
    fn insert_late_policy(&self, policy: LatePolicy) -> Result<LatePolicy, StoreError> {
        if self.fail_policy_writes {
            return Err(disk_full());
        }
        self.inner.insert_late_policy(policy)
    }
    fn update_late_policy(&self, policy: &LatePolicy) -> Result<(), StoreError> {
        if self.fail_policy_writes {
            return Err(disk_full());
        }
        self.inner.update_late_policy(policy)
    }
    fn delete_late_policy(&self, id: i64) -> Result<(), StoreError> {
        if self.fail_policy_writes {
            return Err(disk_full());
        }
        self.inner.delete_late_policy(id)
    }
    fn menu_items(&self) -> Result<Vec<MenuItemRecord>, StoreError> {
        self.inner.menu_items()
    }
}

pub fn app_with(store: Arc<dyn RecordStore>, page_size: usize) -> Router {
    let jwt_config = JwtConfig::from_parts(SECRET.to_string(), None);
    let state = AppState::new(store, jwt_config, page_size).expect("templates load");
    create_app(state)
}

pub fn app(store: &Arc<MemoryStore>) -> Router {
    app_with(store.clone(), 10)
}

pub fn token(login: &str, user_id: i64, role: Role, permissions: &[i64]) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: login.to_string(),
        user_id,
        role,
        permissions: permissions.to_vec(),
        exp: now + 3600,
        iat: Some(now),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn ta_token() -> String {
    token("ta1", TA_ID, Role::Ta, &[MANAGE_PERMISSION])
}

pub fn instructor_token() -> String {
    token(
        "instructor6",
        INSTRUCTOR_ID,
        Role::Instructor,
        &[MANAGE_PERMISSION, POLICY_PERMISSION],
    )
}

pub fn other_instructor_token() -> String {
    token(
        "instructor9",
        OTHER_INSTRUCTOR_ID,
        Role::Instructor,
        &[MANAGE_PERMISSION, POLICY_PERMISSION],
    )
}

pub fn admin_token() -> String {
    token("admin", 1, Role::Admin, &[MANAGE_PERMISSION, POLICY_PERMISSION])
}

pub fn student_token() -> String {
    token("student20", 20, Role::Student, &[])
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// Flash set by a redirect, read back the way the next request would.
pub fn flash_of(response: &Response) -> Option<Flash> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?;
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(pair).ok()?);
    Flash::from_headers(&headers)
}
