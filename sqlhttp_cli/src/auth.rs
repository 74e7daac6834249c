use crate::gateway::respond;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sqlhttp_core::QueryResult;
use tracing::warn;

pub(crate) const BAD_USER_PASSWORD: &str = "Bad user password";

/// Credentials taken from an HTTP Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Parse `Basic <base64(username:password)>`; the scheme is case-insensitive.
    fn parse(header: &HeaderValue) -> Option<Self> {
        let value = header.to_str().ok()?;
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BasicAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(BasicAuth::parse)
            .ok_or_else(|| {
                warn!("{BAD_USER_PASSWORD}");
                respond(
                    StatusCode::UNAUTHORIZED,
                    &QueryResult::error(BAD_USER_PASSWORD),
                )
            })
    }
}
