use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::{Capability, Role};
use super::session::{Session, SessionError, SessionStore, SessionToken};

/// Request-scoped handle to the session store, installed as an extension layer
/// on every protected router.
#[derive(Clone)]
pub struct AuthContext {
    sessions: Arc<dyn SessionStore>,
}

impl AuthContext {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

/// Extractor resolving the bearer token into a live session. Handlers that
/// declare it are authenticated; everything else stays public.
pub struct Authenticated(pub Session);

impl Authenticated {
    pub fn actor(&self) -> &str {
        &self.0.username
    }

    pub fn require(&self, capability: Capability) -> Result<(), AuthRejection> {
        if self.0.role.permits(capability) {
            Ok(())
        } else {
            Err(AuthRejection::Forbidden {
                role: self.0.role,
                capability,
            })
        }
    }
}

#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    UnknownToken,
    StoreUnavailable(String),
    Misconfigured,
    Forbidden { role: Role, capability: Capability },
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRejection::MissingToken => write!(f, "missing bearer token"),
            AuthRejection::UnknownToken => write!(f, "unknown or expired bearer token"),
            AuthRejection::StoreUnavailable(detail) => {
                write!(f, "session store unavailable: {detail}")
            }
            AuthRejection::Misconfigured => write!(f, "authentication layer not installed"),
            AuthRejection::Forbidden { role, capability } => {
                write!(f, "role {} may not {}", role.label(), capability.label())
            }
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = match self {
            AuthRejection::MissingToken | AuthRejection::UnknownToken => StatusCode::UNAUTHORIZED,
            AuthRejection::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthRejection::StoreUnavailable(_) | AuthRejection::Misconfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthRejection::Misconfigured)?;

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthRejection::MissingToken)?;

        match context.sessions.resolve(&SessionToken(token.to_string())) {
            Ok(Some(session)) => Ok(Authenticated(session)),
            Ok(None) => Err(AuthRejection::UnknownToken),
            Err(SessionError::Unavailable(detail)) => Err(AuthRejection::StoreUnavailable(detail)),
        }
    }
}
