use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::AuditSink;

use super::domain::{Capability, Role, UserAccount, UserId, UserView};
use super::extract::Authenticated;
use super::repository::UserDirectory;
use super::service::{AccessError, AccessService, NewUser};
use super::session::SessionStore;

/// Router exposing the public login endpoint. Mounted outside the
/// authenticated surface.
pub fn auth_router<D, S, A>(service: Arc<AccessService<D, S, A>>) -> Router
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/auth/login", post(login_handler::<D, S, A>))
        .with_state(service)
}

/// Router for session introspection and teardown; requires a bearer token.
pub fn session_router<D, S, A>(service: Arc<AccessService<D, S, A>>) -> Router
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/auth/logout", post(logout_handler::<D, S, A>))
        .route("/api/v1/auth/me", get(me_handler))
        .with_state(service)
}

/// Router for user administration; every handler requires `ManageUsers`.
pub fn user_admin_router<D, S, A>(service: Arc<AccessService<D, S, A>>) -> Router
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/users",
            post(create_user_handler::<D, S, A>).get(list_users_handler::<D, S, A>),
        )
        .route(
            "/api/v1/users/:user_id/deactivate",
            post(deactivate_user_handler::<D, S, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    username: String,
    access_code: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    token: String,
    user_id: UserId,
    username: String,
    role: Role,
    role_label: &'static str,
    issued_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewUserRequest {
    username: String,
    display_name: String,
    role: Role,
    access_code: String,
}

pub(crate) async fn login_handler<D, S, A>(
    State(service): State<Arc<AccessService<D, S, A>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    match service.login(&request.username, &request.access_code) {
        Ok(session) => {
            let view = SessionView {
                token: session.token.0.clone(),
                user_id: session.user_id,
                username: session.username,
                role: session.role,
                role_label: session.role.label(),
                issued_at: session.issued_at,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => access_error_response(error),
    }
}

pub(crate) async fn logout_handler<D, S, A>(
    State(service): State<Arc<AccessService<D, S, A>>>,
    user: Authenticated,
) -> Response
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    let actor = user.actor().to_string();
    match service.logout(&user.0.token, &actor) {
        Ok(_) => {
            let payload = json!({ "status": "logged_out" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => access_error_response(error),
    }
}

pub(crate) async fn me_handler(user: Authenticated) -> Response {
    let session = user.0;
    let payload = json!({
        "user_id": session.user_id.0,
        "username": session.username,
        "role": session.role,
        "role_label": session.role.label(),
        "issued_at": session.issued_at,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn create_user_handler<D, S, A>(
    State(service): State<Arc<AccessService<D, S, A>>>,
    user: Authenticated,
    axum::Json(request): axum::Json<NewUserRequest>,
) -> Response
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManageUsers) {
        return rejection.into_response();
    }

    let new_user = NewUser {
        username: request.username,
        display_name: request.display_name,
        role: request.role,
        access_code: request.access_code,
    };

    match service.create_user(new_user, user.actor()) {
        Ok(account) => (StatusCode::CREATED, axum::Json(account.view())).into_response(),
        Err(error) => access_error_response(error),
    }
}

pub(crate) async fn list_users_handler<D, S, A>(
    State(service): State<Arc<AccessService<D, S, A>>>,
    user: Authenticated,
) -> Response
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManageUsers) {
        return rejection.into_response();
    }

    match service.list_users() {
        Ok(accounts) => {
            let views: Vec<UserView> = accounts.iter().map(UserAccount::view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => access_error_response(error),
    }
}

pub(crate) async fn deactivate_user_handler<D, S, A>(
    State(service): State<Arc<AccessService<D, S, A>>>,
    user: Authenticated,
    Path(user_id): Path<String>,
) -> Response
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = user.require(Capability::ManageUsers) {
        return rejection.into_response();
    }

    match service.deactivate_user(&UserId(user_id), user.actor()) {
        Ok(account) => (StatusCode::OK, axum::Json(account.view())).into_response(),
        Err(error) => access_error_response(error),
    }
}

fn access_error_response(error: AccessError) -> Response {
    let status = match &error {
        AccessError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccessError::AccountDisabled => StatusCode::FORBIDDEN,
        AccessError::EmptyUsername | AccessError::EmptyAccessCode => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AccessError::UsernameTaken(_) => StatusCode::CONFLICT,
        AccessError::UnknownUser(_) => StatusCode::NOT_FOUND,
        AccessError::Directory(_) | AccessError::Session(_) | AccessError::Audit(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
