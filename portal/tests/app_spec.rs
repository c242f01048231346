mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::*;
use portal::auth::Role;

#[tokio::test]
async fn test_health_endpoint() {
    let store = seeded_store();
    let app = app(&store);

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn test_404_handling() {
    let store = seeded_store();
    let app = app(&store);

    let response = send(&app, get("/nonexistent", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("404 - Page Not Found"));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let store = seeded_store();
    let app = app(&store);

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = portal::auth::Claims {
        sub: "ta1".to_string(),
        user_id: TA_ID,
        role: Role::Ta,
        permissions: vec![MANAGE_PERMISSION],
        exp: now - 3600,
        iat: Some(now - 7200),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = send(&app, get("/questions", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let store = seeded_store();
    let app = app(&store);

    let request = Request::builder()
        .uri("/questions")
        .header(header::AUTHORIZATION, "Basic dGE6cGFzcw==")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let store = seeded_store();
    let app = app(&store);

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &portal::auth::Claims {
            sub: "ta1".to_string(),
            user_id: TA_ID,
            role: Role::Ta,
            permissions: vec![],
            exp: chrono::Utc::now().timestamp() as usize + 3600,
            iat: None,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    let response = send(&app, get("/questions", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
