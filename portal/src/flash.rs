//! One-shot flash messages carried across a redirect in a cookie.

use axum::{
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const FLASH_COOKIE: &str = "portal_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Notice,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub messages: Vec<FlashMessage>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self::new().with(FlashLevel::Notice, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new().with(FlashLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new().with(FlashLevel::Error, message)
    }

    pub fn with(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level,
            message: message.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// First message of the given level.
    pub fn get(&self, level: FlashLevel) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.level == level)
            .map(|m| m.message.as_str())
    }

    fn to_cookie(&self) -> Cookie<'static> {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        Cookie::build((FLASH_COOKIE, json))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Reads the flash cookie from a request, if present and well-formed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::from_jar(&CookieJar::from_headers(headers))
    }

    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        let raw = jar.get(FLASH_COOKIE)?.value();
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Flash>(raw) {
            Ok(flash) if !flash.is_empty() => Some(flash),
            Ok(_) => None,
            Err(e) => {
                warn!("Discarding malformed flash cookie: {}", e);
                None
            }
        }
    }
}

/// Expires the flash cookie if the request carried one.
pub fn consume(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
}

/// 303 redirect carrying `flash` to the next page.
pub fn redirect_with(location: &str, flash: Flash) -> Response {
    let jar = CookieJar::new().add(flash.to_cookie());
    (jar, Redirect::to(location)).into_response()
}
