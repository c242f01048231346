//! JWT bearer authentication
//!
//! Tokens are issued elsewhere; this module only verifies them and exposes
//! the caller as a [`Principal`] carrying role and menu permissions.

use std::collections::HashSet;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{AppError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Ta,
    Instructor,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn has_ta_privileges(self) -> bool {
        !matches!(self, Role::Student)
    }

    pub fn has_instructor_privileges(self) -> bool {
        matches!(self, Role::Instructor | Role::Admin | Role::SuperAdmin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,        // Subject (login name)
    pub user_id: i64,       // Portal user id
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<i64>, // Permission ids granted to the role
    pub exp: usize,         // Expiration time (Unix timestamp)
    pub iat: Option<usize>, // Issued at (Unix timestamp)
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
}

impl JwtConfig {
    pub fn new(secret: String, algorithm: Algorithm) -> Self {
        Self { secret, algorithm }
    }

    /// Unknown algorithm names fall back to HS256.
    pub fn from_parts(secret: String, algorithm: Option<&str>) -> Self {
        let algorithm = match algorithm {
            Some("HS384") => Algorithm::HS384,
            Some("HS512") => Algorithm::HS512,
            _ => Algorithm::HS256,
        };
        Self { secret, algorithm }
    }
}

/// Authenticated caller, attached to request extensions by [`jwt_middleware`].
#[derive(Debug, Clone)]
pub struct Principal {
    pub login: String,
    pub user_id: i64,
    pub role: Role,
    pub permissions: HashSet<i64>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            login: claims.sub,
            user_id: claims.user_id,
            role: claims.role,
            permissions: claims.permissions.into_iter().collect(),
        }
    }
}

impl Principal {
    pub fn require_ta(&self) -> Result<(), AppError> {
        if self.role.has_ta_privileges() {
            Ok(())
        } else {
            warn!("{} lacks TA privileges", self.login);
            Err(AppError::forbidden())
        }
    }

    pub fn require_instructor(&self) -> Result<(), AppError> {
        if self.role.has_instructor_privileges() {
            Ok(())
        } else {
            warn!("{} lacks instructor privileges", self.login);
            Err(AppError::forbidden())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "Authentication required"))
    }
}

/// Validates a bearer token when one is sent. Requests without an
/// Authorization header continue anonymously; handlers that need a caller
/// extract [`Principal`] and get a 401 otherwise.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header_value) = request.headers().get("Authorization").cloned() else {
        return next.run(request).await;
    };

    let Ok(auth_str) = header_value.to_str() else {
        warn!("Failed to parse Authorization header");
        return unauthorized_response("Invalid Authorization header".to_string());
    };

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        warn!("Authorization header not in Bearer format");
        return unauthorized_response("Authorization header must use Bearer scheme".to_string());
    };

    match verify_jwt(token, &state.jwt_config) {
        Ok(claims) => {
            debug!(
                "JWT token validated for subject: {}, role: {:?}",
                claims.sub, claims.role
            );
            request.extensions_mut().insert(Principal::from(claims));
            next.run(request).await
        }
        Err(e) => {
            warn!("JWT validation failed: {}", e);
            unauthorized_response(format!("Invalid token: {}", e))
        }
    }
}

/// Verify JWT token and extract claims
pub fn verify_jwt(token: &str, config: &JwtConfig) -> Result<Claims, String> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = true;

    let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Token decode error: {}", e))?;

    Ok(token_data.claims)
}

fn unauthorized_response(message: String) -> Response {
    (StatusCode::UNAUTHORIZED, message).into_response()
}
